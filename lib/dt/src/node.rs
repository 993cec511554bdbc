use crate::prop::{Property, PropertyError};
use alloc::{boxed::Box, string::String, vec, vec::Vec};

/// Arena of nodes. Node `root_id` is its own parent.
#[derive(Debug, Clone)]
pub struct DeviceTree {
    pub root_id: usize,
    pub container: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub node_id: usize,
    pub parent_id: usize,
    /// `name@unit-address`
    pub full_name: Box<str>,
    pub node_name: Box<str>,
    pub unit_addr: Box<str>,
    pub children: Vec<usize>,
    pub props: Vec<Property>,
}

impl Default for DeviceTree {
    fn default() -> Self {
        DeviceTree::new()
    }
}

/// Construction
impl DeviceTree {
    pub fn new() -> DeviceTree {
        DeviceTree {
            root_id: 0,
            container: vec![Node {
                node_id: 0,
                parent_id: 0,
                full_name: Box::from(""),
                node_name: Box::from(""),
                unit_addr: Box::from(""),
                children: vec![],
                props: vec![],
            }],
        }
    }

    /// Append a child under `parent` and return its id.
    pub fn add_node(&mut self, parent: usize, full_name: impl AsRef<str>) -> usize {
        let full_name = full_name.as_ref();
        let (node_name, unit_addr) = full_name.split_once('@').unwrap_or((full_name, ""));
        let node_id = self.container.len();
        self.container.push(Node {
            node_id,
            parent_id: parent,
            full_name: Box::from(full_name),
            node_name: Box::from(node_name),
            unit_addr: Box::from(unit_addr),
            children: vec![],
            props: vec![],
        });
        self.container[parent].children.push(node_id);
        node_id
    }

    /// Attach `prop` to `node`, replacing any property with the same name.
    pub fn add_property(&mut self, node: usize, prop: Property) {
        let props = &mut self.container[node].props;
        match props.iter_mut().find(|p| p.name == prop.name) {
            Some(slot) => *slot = prop,
            None => props.push(prop),
        }
    }
}

/// Queries
impl DeviceTree {
    pub fn root(&self) -> &Node {
        &self.container[self.root_id]
    }
    pub fn is_root(&self, node: &Node) -> bool {
        self.get_parent(node).node_id == node.node_id
    }
    fn full_path(&self, node: &Node) -> String {
        if self.is_root(node) {
            String::new()
        } else {
            self.full_path(self.get_parent(node)) + "/" + node.full_name.as_ref()
        }
    }
    pub fn get_full_path(&self, node: &Node) -> Box<str> {
        let path = self.full_path(node);
        if path.is_empty() {
            Box::from("/")
        } else {
            path.into_boxed_str()
        }
    }
    pub fn get_parent(&self, node: &Node) -> &Node {
        &self.container[node.parent_id]
    }
    pub fn get_children<'b>(&'b self, node: &Node) -> impl Iterator<Item = &'b Node> {
        node.children.iter().map(|x| &self.container[*x])
    }
    /// Every node except the root, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.container.iter().filter(|n| n.node_id != self.root_id)
    }
    pub fn get_property<'b>(&self, node: &'b Node, name: impl AsRef<str>) -> Option<&'b Property> {
        let name = name.as_ref();
        node.props.iter().find(|prop| prop.name.as_ref() == name)
    }
    /// Like [DeviceTree::get_property], but a missing property is an error.
    pub fn require_property<'b>(
        &self,
        node: &'b Node,
        name: impl AsRef<str>,
    ) -> Result<&'b Property, PropertyError> {
        self.get_property(node, name).ok_or(PropertyError::NotFound)
    }
    pub fn get_node(&self, path: impl AsRef<str>) -> Option<&Node> {
        let mut node = self.root();
        for section in path.as_ref().split('/') {
            if section.trim().is_empty() {
                continue;
            }
            node = self
                .get_children(node)
                .find(|subnode| subnode.full_name.as_ref() == section)?;
        }
        Some(node)
    }
    /// Resolve a path where any section may be `*` or a bare node name without unit address.
    pub fn get_nodes(&self, path: impl AsRef<str>) -> Vec<&Node> {
        let path: Vec<&str> = path.as_ref().split('/').collect();
        self.get_sub_nodes(self.root(), &path, 0)
    }
    fn get_sub_nodes<'b>(&'b self, node: &'b Node, path: &[&str], mut cursor: usize) -> Vec<&'b Node> {
        while cursor < path.len() && path[cursor].trim().is_empty() {
            cursor += 1;
        }
        if cursor >= path.len() {
            return vec![node];
        }
        let sec = path[cursor];
        self.get_children(node)
            .flat_map(|child| {
                if sec == "*" || child.full_name.as_ref() == sec || child.node_name.as_ref() == sec {
                    self.get_sub_nodes(child, path, cursor + 1)
                } else {
                    vec![]
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceTree {
        let mut tree = DeviceTree::new();
        let soc = tree.add_node(0, "soc");
        let gpio = tree.add_node(soc, "gpio@7e200000");
        tree.add_property(gpio, Property::with_strs("gpio-names", &["pin_a"]));
        tree.add_node(soc, "uart@7e201000");
        tree
    }

    #[test]
    fn path_lookup() {
        let tree = sample();
        let node = tree.get_node("/soc/gpio@7e200000").unwrap();
        assert_eq!(node.node_name.as_ref(), "gpio");
        assert_eq!(node.unit_addr.as_ref(), "7e200000");
        assert_eq!(tree.get_full_path(node).as_ref(), "/soc/gpio@7e200000");
        assert_eq!(tree.get_full_path(tree.root()).as_ref(), "/");
        assert!(tree.get_node("/soc/gpio").is_none());
    }

    #[test]
    fn wildcard_and_bare_names() {
        let tree = sample();
        assert_eq!(tree.get_nodes("/soc/*").len(), 2);
        assert_eq!(tree.get_nodes("/soc/gpio").len(), 1);
        assert!(tree.get_nodes("/bus/*").is_empty());
    }

    #[test]
    fn properties_replace_by_name() {
        let mut tree = sample();
        let id = tree.get_node("/soc/gpio@7e200000").unwrap().node_id;
        tree.add_property(id, Property::with_strs("gpio-names", &["pin_a", "pin_b"]));
        let node = &tree.container[id];
        assert_eq!(node.props.len(), 1);
        let prop = tree.require_property(node, "gpio-names").unwrap();
        assert_eq!(prop.count_strings(), Ok(2));
        assert_eq!(
            tree.require_property(node, "status"),
            Err(PropertyError::NotFound)
        );
    }
}
