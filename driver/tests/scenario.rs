use dt::{DeviceTree, Property};
use rgpio::{
    FileError, GpioDriver,
    dev::sim::{Event, SimPlatform},
    uaccess::BadAddress,
};
use rgpio_api::{Command, Errno, Payload};

fn board(lines: &[(&str, i32)]) -> SimPlatform {
    let sim = SimPlatform::new();
    for (name, level) in lines {
        sim.add_line(*name, *level);
    }
    sim
}

fn gpio_tree(names: &[&str]) -> DeviceTree {
    let mut tree = DeviceTree::new();
    let soc = tree.add_node(0, "soc");
    let gpio = tree.add_node(soc, "rust-gpio@0");
    tree.add_property(gpio, Property::with_strs("compatible", &["raspberrypi,rpi-gpio"]));
    tree.add_property(gpio, Property::with_strs("gpio-names", names));
    tree
}

fn ioctl_get(file: &mut rgpio::File<'_, rgpio::dev::sim::SimLine>, cmd: Command) -> i32 {
    let mut out = [0u8; Payload::LEN];
    file.ioctl(cmd.into(), &mut out[..]).unwrap();
    Payload::from_bytes(out).0
}

fn ioctl_set(file: &mut rgpio::File<'_, rgpio::dev::sim::SimLine>, cmd: Command, value: i32) {
    let mut arg = Payload(value).to_bytes();
    file.ioctl(cmd.into(), &mut arg[..]).unwrap();
}

#[test]
fn two_line_session() {
    let sim = board(&[("pin_a", 0), ("pin_b", 0)]);
    let tree = gpio_tree(&["pin_a", "pin_b"]);
    let devices = GpioDriver::default().probe_tree(&sim, &tree).unwrap();
    assert_eq!(sim.node_names(), ["r_gpio0", "r_gpio1"]);

    let dev0 = sim.lookup_node("/dev/r_gpio0").unwrap();
    let dev1 = sim.lookup_node("r_gpio1").unwrap();
    let mut file0 = devices.open(dev0).unwrap();
    let mut file1 = devices.open(dev1).unwrap();

    let mut buf = [0u8; 32];
    assert_eq!(file0.read(&mut buf[..]), Ok(2));
    assert_eq!(&buf[..2], b"0\n");
    assert_eq!(file0.read(&mut buf[..]), Ok(0));

    assert_eq!(file0.write(&b"1"[..]), Ok(1));
    assert_eq!(ioctl_get(&mut file0, Command::GetLine), 1);
    assert_eq!(sim.line_level("pin_a"), Some(1));
    assert_eq!(sim.line_level("pin_b"), Some(0));

    ioctl_set(&mut file1, Command::SetShadow, 42);
    assert_eq!(ioctl_get(&mut file1, Command::GetShadow), 42);
    assert_eq!(ioctl_get(&mut file0, Command::GetShadow), 1);

    file0.release();
    drop(file1);
    sim.clear_journal();
    devices.remove();

    let journal = sim.journal();
    let released: Vec<&Event> = journal
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::LinePut(_) | Event::ClassDestroy(_) | Event::RegionFree(_)
            )
        })
        .collect();
    assert!(matches!(
        released.as_slice(),
        [
            Event::LinePut(b),
            Event::LinePut(a),
            Event::ClassDestroy(class),
            Event::RegionFree(_),
        ] if b == "pin_b" && a == "pin_a" && class == "rust_devices"
    ));
    assert!(sim.is_clean());
}

#[test]
fn read_and_get_line_sample_the_live_level() {
    let sim = board(&[("pin_a", 0)]);
    let devices = GpioDriver::default().probe_lines(&sim, &["pin_a"]).unwrap();
    let dev = sim.lookup_node("r_gpio0").unwrap();

    let mut file = devices.open(dev).unwrap();
    let mut buf = [0u8; 32];
    assert_eq!(file.read(&mut buf[..]), Ok(2));
    assert_eq!(&buf[..2], b"0\n");
    file.release();

    assert!(sim.set_line_level("pin_a", 1));
    assert!(!sim.set_line_level("pin_z", 1));

    let mut file = devices.open(dev).unwrap();
    assert_eq!(file.read(&mut buf[..]), Ok(2));
    assert_eq!(&buf[..2], b"1\n");
    assert_eq!(ioctl_get(&mut file, Command::GetLine), 1);
    assert_eq!(ioctl_get(&mut file, Command::GetShadow), 0);
}

#[test]
fn teardown_order_per_device() {
    let sim = board(&[("pin_a", 0), ("pin_b", 1)]);
    let devices = GpioDriver::default()
        .probe_lines(&sim, &["pin_a", "pin_b"])
        .unwrap();
    let region = devices.region().unwrap();
    sim.clear_journal();
    drop(devices);
    assert_eq!(
        sim.journal(),
        vec![
            Event::NodeDestroy("r_gpio1".into()),
            Event::CdevDel(region.get(1).unwrap()),
            Event::LinePut("pin_b".into()),
            Event::NodeDestroy("r_gpio0".into()),
            Event::CdevDel(region.get(0).unwrap()),
            Event::LinePut("pin_a".into()),
            Event::ClassDestroy("rust_devices".into()),
            Event::RegionFree(region),
        ]
    );
}

#[test]
fn per_call_errors_map_to_errno() {
    let sim = board(&[("pin_a", 0)]);
    let devices = GpioDriver::default().probe_lines(&sim, &["pin_a"]).unwrap();
    let mut file = devices.open_index(0).unwrap();

    let err = file.write(&b"x"[..]).unwrap_err();
    assert_eq!(err.errno(), Errno::EINVAL);
    assert_eq!(err.errno().as_return(), -22);
    let err = file.ioctl(Command::GetLine.into(), &mut BadAddress(4)).unwrap_err();
    assert_eq!(err, FileError::Fault);
    assert_eq!(err.errno(), Errno::EFAULT);
    assert_eq!(devices.open_index(1).err().map(FileError::errno), Some(Errno::ENXIO));

    // a failed call leaves the session usable
    assert_eq!(file.write(&b"1\n"[..]), Ok(2));
    assert_eq!(sim.line_level("pin_a"), Some(1));
}

#[test]
fn missing_property_publishes_nothing() {
    let sim = SimPlatform::new();
    let mut tree = DeviceTree::new();
    let gpio = tree.add_node(0, "rust-gpio@0");
    tree.add_property(gpio, Property::with_strs("compatible", &["raspberrypi,rpi-gpio"]));
    let devices = GpioDriver::default().probe_tree(&sim, &tree).unwrap();
    assert!(devices.is_empty());
    assert!(sim.node_names().is_empty());
    assert_eq!(sim.class_names(), ["rust_devices"]);
    devices.remove();
    assert!(sim.is_clean());
}

#[test]
fn custom_names() {
    let sim = board(&[("led", 0)]);
    let driver = GpioDriver::new(rgpio::DriverConfig {
        device_prefix: "led_gpio".into(),
        class_name: "leds".into(),
        ..Default::default()
    });
    let devices = driver.probe_lines(&sim, &["led"]).unwrap();
    assert_eq!(sim.node_names(), ["led_gpio0"]);
    assert_eq!(sim.class_names(), ["leds"]);
    assert_eq!(devices.device(0).map(|d| d.node_name()), Some("led_gpio0"));
}

#[test]
fn two_probes_get_distinct_majors() {
    let sim = board(&[("pin_a", 0), ("pin_b", 0)]);
    let first = GpioDriver::default().probe_lines(&sim, &["pin_a"]).unwrap();
    let second = GpioDriver::new(rgpio::DriverConfig {
        device_prefix: "b_gpio".into(),
        class_name: "b_devices".into(),
        ..Default::default()
    })
    .probe_lines(&sim, &["pin_b"])
    .unwrap();
    let (a, b) = (first.region().unwrap(), second.region().unwrap());
    assert_ne!(a.base.major(), b.base.major());
    assert!(second.open(a.base).is_err());
}
