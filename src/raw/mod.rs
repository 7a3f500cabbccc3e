mod arena;
mod handle;
mod node;
mod raw_avl_map;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub(crate) use raw_avl_map::RawAvlMap;
