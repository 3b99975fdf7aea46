use fusion_types::constants::{
    EEL_EXPRESSION_KEY, OBJECT_TYPE_KEY, PROTOTYPES_KEY, STOP_INHERITANCE_CHAIN_KEY, VALUE_KEY,
};
use indexmap::IndexMap;
use serde::{ser::SerializeMap, Serialize, Serializer};

pub type NodeMap = IndexMap<String, Node>;

/// A value in the merged tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Node>),
    Map(NodeMap),
}

impl Node {
    /// `{__eelExpression: code, __value: null, __objectType: null}`
    pub fn eel_expression(code: impl Into<String>) -> Node {
        Node::Map(NodeMap::from([
            (EEL_EXPRESSION_KEY.to_string(), Node::String(code.into())),
            (VALUE_KEY.to_string(), Node::Null),
            (OBJECT_TYPE_KEY.to_string(), Node::Null),
        ]))
    }

    /// `{__objectType: name, __value: null, __eelExpression: null}`
    pub fn object_type(name: impl Into<String>) -> Node {
        Node::Map(NodeMap::from([
            (OBJECT_TYPE_KEY.to_string(), Node::String(name.into())),
            (VALUE_KEY.to_string(), Node::Null),
            (EEL_EXPRESSION_KEY.to_string(), Node::Null),
        ]))
    }

    /// `{__value: value, __eelExpression: null, __objectType: null}`
    pub fn tagged_value(value: Node) -> Node {
        Node::Map(NodeMap::from([
            (VALUE_KEY.to_string(), value),
            (EEL_EXPRESSION_KEY.to_string(), Node::Null),
            (OBJECT_TYPE_KEY.to_string(), Node::Null),
        ]))
    }

    pub fn empty_map() -> Node {
        Node::Map(NodeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?.get(key)
    }

    /// The plain value a consumer sees: the `__value` of a map that folded a
    /// scalar in, or the node itself.
    pub fn resolved(&self) -> &Node {
        match self.get(VALUE_KEY) {
            Some(value) if !value.is_null() => value,
            _ => self,
        }
    }

    /// True when an unset stopped inheritance at this node.
    pub fn stops_inheritance_chain(&self) -> bool {
        matches!(self.get(STOP_INHERITANCE_CHAIN_KEY), Some(Node::Bool(true)))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Node {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Node {
        Node::Int(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Node {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Node {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Node {
        Node::String(value)
    }
}

impl From<NodeMap> for Node {
    fn from(value: NodeMap) -> Node {
        Node::Map(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(value) => serializer.serialize_bool(*value),
            Node::Int(value) => serializer.serialize_i64(*value),
            Node::Float(value) => serializer.serialize_f64(*value),
            Node::String(value) => serializer.serialize_str(value),
            Node::List(values) => values.serialize(serializer),
            Node::Map(map) => serialize_node_map(map, serializer),
        }
    }
}

fn serialize_node_map<S: Serializer>(map: &NodeMap, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        state.serialize_entry(key, value)?;
    }
    state.end()
}

/// The nested, ordered configuration every statement of a parse run is folded into.
///
/// Keys keep the position of their first insertion. Removing a key and
/// setting it again moves it to the end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedTree {
    tree: NodeMap,
}

impl MergedTree {
    pub fn new() -> MergedTree {
        MergedTree::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.tree.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.tree.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.tree.shift_remove(key)
    }

    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.tree.get(first.as_ref())?, |node, key| node.get(key.as_ref()))
    }

    pub fn as_map(&self) -> &NodeMap {
        &self.tree
    }

    pub fn into_map(self) -> NodeMap {
        self.tree
    }

    /// Writes `value` at `path`.
    ///
    /// Missing intermediate entries become maps, and intermediate scalars are
    /// folded into a map under `__value`. At the final key a `null` removes an
    /// existing entry, a map is merged into an existing map with the new keys
    /// winning, and a scalar written onto a map is stored as its `__value`.
    /// Everything else replaces what was there.
    pub fn set_value_in_tree<S: AsRef<str>>(&mut self, path: &[S], value: Node) {
        set_value_in_object_tree(&mut self.tree, path, value);
    }

    /// Removes whatever is at `path` and leaves a `__stopInheritanceChain` marker in its place.
    pub fn remove_value_in_tree<S: AsRef<str>>(&mut self, path: &[S]) {
        self.set_value_in_tree(path, Node::Null);
        let mut stop_path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        stop_path.push(STOP_INHERITANCE_CHAIN_KEY);
        self.set_value_in_tree(&stop_path, Node::Bool(true));
    }

    /// Copies the value at `source` onto `target`.
    ///
    /// Reading the source materializes it: a missing source becomes an empty
    /// map, which is what gets copied.
    pub fn copy_value_in_tree<S: AsRef<str>>(&mut self, target: &[S], source: &[S]) {
        let value = self.materialize_value(source);
        self.set_value_in_tree(target, value);
    }

    fn materialize_value<S: AsRef<str>>(&mut self, path: &[S]) -> Node {
        let mut current = &mut self.tree;
        for (ix, key) in path.iter().enumerate() {
            let child = current
                .entry(key.as_ref().to_string())
                .or_insert(Node::Null);
            if child.is_null() {
                *child = Node::empty_map();
            }
            if ix + 1 == path.len() {
                return child.clone();
            }
            match child {
                Node::Map(map) => current = map,
                _ => return Node::Null,
            }
        }
        Node::Null
    }

    pub fn parent_path<S>(path: &[S]) -> &[S] {
        match path.split_last() {
            Some((_, parent)) => parent,
            None => path,
        }
    }

    /// True for paths ending in `__prototypes.<name>`.
    pub fn path_is_prototype<S: AsRef<str>>(path: &[S]) -> bool {
        path.len() >= 2 && path[path.len() - 2].as_ref() == PROTOTYPES_KEY
    }
}

impl Serialize for MergedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_node_map(&self.tree, serializer)
    }
}

fn set_value_in_object_tree<S: AsRef<str>>(tree: &mut NodeMap, path: &[S], value: Node) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };
    let key = key.as_ref();

    if rest.is_empty() {
        let is_set = tree.get(key).is_some_and(|existing| !existing.is_null());
        if is_set && value.is_null() {
            tree.shift_remove(key);
            return;
        }
        if let Some(Node::Map(existing)) = tree.get_mut(key) {
            match value {
                Node::Map(value) => merge_recursive_overrule(existing, value),
                value => {
                    existing.insert(VALUE_KEY.to_string(), value);
                    existing.insert(EEL_EXPRESSION_KEY.to_string(), Node::Null);
                    existing.insert(OBJECT_TYPE_KEY.to_string(), Node::Null);
                }
            }
            return;
        }
        tree.insert(key.to_string(), value);
        return;
    }

    let child = tree.entry(key.to_string()).or_insert(Node::Null);
    if !matches!(child, Node::Map(_)) {
        let previous = std::mem::replace(child, Node::Null);
        *child = if previous.is_null() {
            Node::empty_map()
        } else {
            Node::tagged_value(previous)
        };
    }
    if let Node::Map(child) = child {
        set_value_in_object_tree(child, rest, value);
    }
}

/// Merges `overrule` into `base`. Maps on both sides merge recursively; any
/// other value from `overrule` replaces the one in `base`.
fn merge_recursive_overrule(base: &mut NodeMap, overrule: NodeMap) {
    for (key, value) in overrule {
        match value {
            Node::Map(value) => match base.get_mut(&key) {
                Some(Node::Map(existing)) => merge_recursive_overrule(existing, value),
                _ => {
                    base.insert(key, Node::Map(value));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
