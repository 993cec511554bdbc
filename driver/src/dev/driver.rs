//! Driver identity and device-tree matching.
//!
//! A driver names the `compatible` strings it binds to; [of_match_node] finds the first
//! available node in a [DeviceTree] that carries one of them.

use alloc::vec::Vec;
use dt::{DeviceTree, Node};

pub trait Driver {
    fn get_name(&self) -> &str;
    fn get_comp_strs(&self) -> &[alloc::string::String];
}

/// A node without `status`, or with `status = "okay"`/`"ok"`, is available.
pub fn is_available(tree: &DeviceTree, node: &Node) -> bool {
    match tree.get_property(node, "status") {
        None => true,
        Some(prop) => matches!(prop.value_as_str(), Ok("okay") | Ok("ok")),
    }
}

/// Whether the node's `compatible` list names one of the driver's strings.
pub fn is_compatible(tree: &DeviceTree, node: &Node, driver: &dyn Driver) -> bool {
    let Some(prop) = tree.get_property(node, "compatible") else {
        return false;
    };
    prop.terminated_strings()
        .iter()
        .any(|comp| driver.get_comp_strs().iter().any(|own| own == comp))
}

/// All available nodes the driver binds to, in tree order.
pub fn of_match_nodes<'t>(tree: &'t DeviceTree, driver: &dyn Driver) -> Vec<&'t Node> {
    tree.nodes()
        .filter(|node| is_compatible(tree, node, driver))
        .filter(|node| {
            let available = is_available(tree, node);
            if !available {
                debug_ex!("\tSkipped disabled node {}.", tree.get_full_path(node));
            }
            available
        })
        .collect()
}

pub fn of_match_node<'t>(tree: &'t DeviceTree, driver: &dyn Driver) -> Option<&'t Node> {
    of_match_nodes(tree, driver).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{string::String, vec};
    use dt::Property;

    struct Fake(Vec<String>);

    impl Driver for Fake {
        fn get_name(&self) -> &str {
            "fake"
        }
        fn get_comp_strs(&self) -> &[String] {
            &self.0
        }
    }

    #[test]
    fn matches_first_available_compatible_node() {
        let mut tree = DeviceTree::new();
        let off = tree.add_node(0, "gpio@0");
        tree.add_property(off, Property::with_strs("compatible", &["vendor,gpio"]));
        tree.add_property(off, Property::with_str("status", "disabled"));
        let on = tree.add_node(0, "gpio@1");
        tree.add_property(on, Property::with_strs("compatible", &["other", "vendor,gpio"]));
        tree.add_node(0, "uart@2");

        let driver = Fake(vec![String::from("vendor,gpio")]);
        let node = of_match_node(&tree, &driver).unwrap();
        assert_eq!(node.full_name.as_ref(), "gpio@1");
        assert_eq!(of_match_nodes(&tree, &driver).len(), 1);

        let nobody = Fake(vec![String::from("vendor,spi")]);
        assert!(of_match_node(&tree, &nobody).is_none());
    }
}
