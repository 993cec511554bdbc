//! `rgpioctl`: probe rgpio against a simulated board and run operations on its devices.
//!
//! ```text
//! rgpioctl --line pin_a --line pin_b=1 read:r_gpio0 write:r_gpio0:1 get-line:r_gpio0
//! ```

mod mapping;
mod op;

use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, bail};
use clap::Parser;
use dt::{DeviceTree, Property};
use log::LevelFilter;
use rgpio::{
    DriverConfig, GpioDriver,
    console::{ConsoleSink, set_sink},
    dev::sim::SimPlatform,
    logging,
};

use mapping::Mapping;
use op::Op;

#[derive(Debug, Parser)]
#[command(name = "rgpioctl", version, about)]
struct Cli {
    /// Simulated GPIO line, with an optional initial level. Listed in probe order.
    #[arg(long = "line", value_name = "NAME[=LEVEL]")]
    lines: Vec<LineSpec>,

    /// Device node name prefix
    #[arg(long, default_value = config::DEVICE_NAME)]
    prefix: String,

    /// Device class name
    #[arg(long, default_value = config::DEVICE_CLASS)]
    class: String,

    /// JSON file mapping aliases to device nodes
    #[arg(long, value_name = "FILE")]
    mapping: Option<PathBuf>,

    /// Verbosity level (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Operations to run, in order: OP:TARGET[:VALUE]
    #[arg(value_name = "OP")]
    ops: Vec<Op>,
}

#[derive(Debug, Clone)]
struct LineSpec {
    name: String,
    level: i32,
}

impl FromStr for LineSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<LineSpec, String> {
        let (name, level) = match s.split_once('=') {
            Some((name, level)) => {
                let level = level
                    .parse()
                    .map_err(|_| format!("bad level '{level}' for line '{name}'"))?;
                (name, level)
            }
            None => (s, 0),
        };
        if name.is_empty() {
            return Err("line name is empty".to_string());
        }
        Ok(LineSpec {
            name: name.to_string(),
            level,
        })
    }
}

struct Stdout;

impl ConsoleSink for Stdout {
    fn put_str(&self, s: &str) {
        print!("{s}");
    }
}

static STDOUT: Stdout = Stdout;

/// One compatible node listing `names` as its GPIO lines.
fn board_tree(names: &[&str]) -> DeviceTree {
    let mut tree = DeviceTree::new();
    let soc = tree.add_node(0, "soc");
    let gpio = tree.add_node(soc, "rust-gpio@0");
    tree.add_property(gpio, Property::with_strs("compatible", &[config::COMPATIBLE]));
    tree.add_property(gpio, Property::with_strs(config::GPIO_NAMES_PROPERTY, names));
    tree
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mapping = match &cli.mapping {
        Some(path) => Mapping::load(path)?,
        None => Mapping::default(),
    };

    let sim = SimPlatform::new();
    for line in &cli.lines {
        sim.add_line(line.name.as_str(), line.level);
    }
    let names: Vec<&str> = cli.lines.iter().map(|line| line.name.as_str()).collect();
    let tree = board_tree(&names);

    let driver = GpioDriver::new(DriverConfig {
        device_prefix: cli.prefix.clone(),
        class_name: cli.class.clone(),
        ..Default::default()
    });
    let devices = driver.probe_tree(&sim, &tree).context("probe failed")?;
    for dev in devices.devices() {
        println!("{} -> /dev/{} ({})", dev.line_name(), dev.node_name(), dev.devnum());
    }

    for op in &cli.ops {
        let node = mapping.resolve(&op.target);
        let file = sim
            .lookup_node(node)
            .ok_or(rgpio::FileError::NoDevice)
            .and_then(|dev| devices.open(dev));
        let result = file.and_then(|mut file| op.run(&mut file));
        match result {
            Ok(out) => println!("{op}: {out}"),
            Err(err) => println!("{op}: error: {err} ({})", err.errno().as_return()),
        }
    }

    devices.remove();
    if !sim.is_clean() {
        bail!("platform still holds resources after teardown");
    }
    println!("teardown complete, platform clean");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    set_sink(&STDOUT);
    if let Err(err) = logging::init(cli.log_level) {
        eprintln!("rgpioctl: {err}");
    }
    if let Err(err) = run(cli) {
        eprintln!("rgpioctl: {err:#}");
        std::process::exit(1);
    }
}
