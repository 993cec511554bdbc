//! Console output. The host installs a sink once; until then output is discarded.

use core::fmt::{Arguments, Write};
use spin::{Mutex, Once};

/// Destination for console text.
pub trait ConsoleSink: Sync {
    fn put_str(&self, s: &str);
}

static SINK: Once<&'static dyn ConsoleSink> = Once::new();
/// Keeps one formatted message contiguous when several threads print.
static PRINT_LOCK: Mutex<()> = Mutex::new(());

/// Install the console sink. Only the first call has an effect; returns whether it did.
pub fn set_sink(sink: &'static dyn ConsoleSink) -> bool {
    let mut installed = false;
    SINK.call_once(|| {
        installed = true;
        sink
    });
    installed
}

struct ConsoleOut(&'static dyn ConsoleSink);

impl Write for ConsoleOut {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

pub fn console_print(args: Arguments) {
    if let Some(sink) = SINK.get() {
        let _guard = PRINT_LOCK.lock();
        // the sink itself never fails
        let _ = ConsoleOut(*sink).write_fmt(args);
    }
}

#[macro_export]
/// print a line to the console sink
macro_rules! console_println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::console_print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?));   // Use LF instead of CR-LF
    }
}
