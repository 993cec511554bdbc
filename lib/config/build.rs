use std::{env, fs, path::PathBuf};

use serde_json::{Map, Value};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let flags_path = PathBuf::from(&manifest_dir).join("../../rgpio.json");
    let flags_str = fs::read_to_string(&flags_path)
        .unwrap_or_else(|err| panic!("Unable to read {}: {}", flags_path.display(), err));
    let flagmap: Map<String, Value> = serde_json::from_str(&flags_str)
        .unwrap_or_else(|err| panic!("Malformed {}: {}", flags_path.display(), err));
    make_flags(&flagmap);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../rgpio.json");
}

fn make_flags(flagmap: &Map<String, Value>) {
    let mut s = String::from("");
    for (key, value) in flagmap {
        let line = match value {
            Value::String(text) => format!("pub const {}: &str = {:?};\n", key, text),
            Value::Number(num) if num.is_u64() => format!("pub const {}: usize = {};\n", key, num),
            _ => panic!("Flag '{}' must be a string or an unsigned integer.", key),
        };
        s += &format!("/// `{}` from rgpio.json\n", key);
        s += &line;
    }
    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(PathBuf::from(out_dir).join("build_flags.rs"), s).unwrap();
}
