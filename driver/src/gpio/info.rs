//! Line discovery from the device-tree node being probed.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use dt::{DeviceTree, Node, PropertyError};
use log::{info, warn};
use rgpio_api::Errno;

/// Line names read from the node, in property order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GpioInfo {
    pub names: Vec<String>,
    /// Problem found while reading the property. It never aborts setup: a missing or empty
    /// property yields no lines, a malformed one yields its well-formed leading entries.
    pub error: Option<PropertyError>,
}

impl GpioInfo {
    pub fn from_node(tree: &DeviceTree, node: &Node, property: &str) -> GpioInfo {
        let Some(prop) = tree.get_property(node, property) else {
            info!("Property '{}' does not exist!", property);
            return GpioInfo {
                names: Vec::new(),
                error: Some(PropertyError::NotFound),
            };
        };
        let (names, error) = match prop.value_as_strlist() {
            Ok(list) => (list, None),
            Err(PropertyError::NoData) => {
                info!("Property '{}' does not have a value!", property);
                (Vec::new(), Some(PropertyError::NoData))
            }
            Err(err @ PropertyError::NotTerminated { .. }) => {
                warn!("The string is not null-terminated within the length of the property data!");
                (prop.terminated_strings(), Some(err))
            }
            Err(err) => {
                warn!("Error reading '{}': {}!", property, err);
                (prop.terminated_strings(), Some(err))
            }
        };
        let names: Vec<String> = names.into_iter().map(ToString::to_string).collect();
        for (index, name) in names.iter().enumerate() {
            info!("GPIO {} | Name: {}", index, name);
        }
        info!("GPIO count: {}", names.len());
        GpioInfo { names, error }
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// The code `of_property_count_strings` would have returned for the reading problem.
    pub fn errno(&self) -> Option<Errno> {
        self.error.map(|err| match err {
            PropertyError::NotFound => Errno::EINVAL,
            PropertyError::NoData => Errno::ENODATA,
            PropertyError::NotTerminated { .. } | PropertyError::InvalidUtf8 { .. } => Errno::EILSEQ,
            PropertyError::OutOfRange { .. } | PropertyError::InvalidFormat => Errno::EINVAL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt::Property;

    fn node_with(prop: Option<Property>) -> (DeviceTree, usize) {
        let mut tree = DeviceTree::new();
        let id = tree.add_node(0, "gpio@0");
        if let Some(prop) = prop {
            tree.add_property(id, prop);
        }
        (tree, id)
    }

    #[test]
    fn reads_names_in_order() {
        let (tree, id) = node_with(Some(Property::with_strs("gpio-names", &["pin_a", "pin_b"])));
        let info = GpioInfo::from_node(&tree, &tree.container[id], "gpio-names");
        assert_eq!(info.names, ["pin_a", "pin_b"]);
        assert_eq!(info.error, None);
        assert_eq!(info.errno(), None);
    }

    #[test]
    fn missing_and_empty_mean_no_lines() {
        let (tree, id) = node_with(None);
        let info = GpioInfo::from_node(&tree, &tree.container[id], "gpio-names");
        assert_eq!(info.count(), 0);
        assert_eq!(info.error, Some(PropertyError::NotFound));
        assert_eq!(info.errno(), Some(Errno::EINVAL));

        let (tree, id) = node_with(Some(Property::empty("gpio-names")));
        let info = GpioInfo::from_node(&tree, &tree.container[id], "gpio-names");
        assert_eq!(info.count(), 0);
        assert_eq!(info.error, Some(PropertyError::NoData));
        assert_eq!(info.errno(), Some(Errno::ENODATA));
    }

    #[test]
    fn malformed_keeps_terminated_prefix() {
        let (tree, id) = node_with(Some(Property::new("gpio-names", b"pin_a\0pin_b".to_vec())));
        let info = GpioInfo::from_node(&tree, &tree.container[id], "gpio-names");
        assert_eq!(info.names, ["pin_a"]);
        assert_eq!(info.error, Some(PropertyError::NotTerminated { valid: 1 }));
        assert_eq!(info.errno(), Some(Errno::EILSEQ));
    }
}
