use std::thread;

use rgpio::{GpioDriver, dev::sim::SimPlatform};
use rgpio_api::{Command, Payload};

const THREADS: i32 = 8;
const ROUNDS: i32 = 200;

#[test]
fn sessions_on_one_device_run_in_parallel() {
    let sim = SimPlatform::new().with_line("pin_a", 0).with_line("pin_b", 0);
    let devices = GpioDriver::default()
        .probe_lines(&sim, &["pin_a", "pin_b"])
        .unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let devices = &devices;
            s.spawn(move || {
                let mut file = devices.open_index(0).unwrap();
                for round in 0..ROUNDS {
                    let value = (t + round) % 2;
                    let text = format!("{value}\n");
                    assert_eq!(file.write(text.as_bytes()), Ok(text.len()));

                    let mut arg = Payload(t).to_bytes();
                    file.ioctl(Command::SetShadow.into(), &mut arg[..]).unwrap();
                    let mut out = [0u8; Payload::LEN];
                    file.ioctl(Command::GetShadow.into(), &mut out[..]).unwrap();
                    let shadow = Payload::from_bytes(out).0;
                    assert!((0..THREADS).contains(&shadow));

                    file.ioctl(Command::GetLine.into(), &mut out[..]).unwrap();
                    assert!(matches!(Payload::from_bytes(out).0, 0 | 1));
                }
            });
        }
    });

    assert!((0..THREADS).contains(&devices.device(0).unwrap().shadow()));
    assert_eq!(devices.device(1).unwrap().shadow(), 0);
    assert_eq!(sim.line_level("pin_b"), Some(0));
    devices.remove();
    assert!(sim.is_clean());
}

#[test]
fn devices_do_not_interfere() {
    let sim = SimPlatform::new().with_line("pin_a", 0).with_line("pin_b", 0);
    let devices = GpioDriver::default()
        .probe_lines(&sim, &["pin_a", "pin_b"])
        .unwrap();

    thread::scope(|s| {
        for index in 0..2usize {
            let devices = &devices;
            s.spawn(move || {
                let mut file = devices.open_index(index).unwrap();
                for round in 0..ROUNDS {
                    let mut arg = Payload(round * 2 + index as i32).to_bytes();
                    file.ioctl(Command::SetShadow.into(), &mut arg[..]).unwrap();
                }
            });
        }
    });

    assert_eq!(devices.device(0).unwrap().shadow(), (ROUNDS - 1) * 2);
    assert_eq!(devices.device(1).unwrap().shadow(), (ROUNDS - 1) * 2 + 1);
}
