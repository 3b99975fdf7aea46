//! Links every prototype to its ancestors.
use crate::merged_tree::{MergedTree, Node, NodeMap};
use fusion_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use fusion_types::{
    constants::{PROTOTYPES_KEY, PROTOTYPE_CHAIN_KEY, PROTOTYPE_OBJECT_NAME_KEY},
    Span,
};
use indexmap::IndexSet;

/// Writes `__prototypeChain` into every prototype that inherits from another.
///
/// The chain lists the ancestors from the most distant one down to the direct
/// parent. Walking stops at an ancestor that is not declared. Revisiting a
/// prototype during the walk is an inheritance cycle.
pub fn build_prototype_hierarchy(
    handler: &Handler,
    tree: &mut MergedTree,
) -> Result<(), ErrorEmitted> {
    let Some(Node::Map(prototypes)) = tree.get_mut(PROTOTYPES_KEY) else {
        return Ok(());
    };

    let mut chains = vec![];
    for name in prototypes.keys() {
        let chain = prototype_chain(prototypes, name).map_err(|chain| {
            handler.emit_err(CompileError::RecursivePrototypeInheritance {
                prototype: name.clone(),
                chain,
                span: Span::dummy(),
            })
        })?;
        if !chain.is_empty() {
            chains.push((name.clone(), chain));
        }
    }

    for (name, chain) in chains {
        if let Some(Node::Map(prototype)) = prototypes.get_mut(&name) {
            let chain = chain.into_iter().map(Node::String).collect();
            prototype.insert(PROTOTYPE_CHAIN_KEY.to_string(), Node::List(chain));
        }
    }
    Ok(())
}

/// On a cycle, returns the names walked through, ending with the one seen twice.
fn prototype_chain(prototypes: &NodeMap, name: &str) -> Result<Vec<String>, Vec<String>> {
    let mut chain = vec![];
    let mut visited = IndexSet::from([name]);
    let mut current = name;
    while let Some(parent) = prototypes
        .get(current)
        .and_then(|prototype| prototype.get(PROTOTYPE_OBJECT_NAME_KEY))
        .and_then(Node::as_str)
    {
        if !visited.insert(parent) {
            let mut walked: Vec<String> = visited.iter().map(|name| name.to_string()).collect();
            walked.push(parent.to_string());
            return Err(walked);
        }
        chain.insert(0, parent.to_string());
        current = parent;
    }
    Ok(chain)
}
