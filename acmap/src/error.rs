use thiserror::Error;

/// 构建期（插入模式串时）的输入错误。
///
/// 这类错误只作用于单条模式串：被拒绝的模式不会在 trie 中留下任何节点，
/// 调用方可以继续插入后续模式。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("empty pattern")]
    EmptyPattern,

    #[error("symbol {:?} at offset {offset} is outside the alphabet", char::from(*symbol))]
    InvalidSymbol { symbol: u8, offset: usize },

    /// 节点或模式数超出 [`NodeId`](crate::automaton::NodeId) 的表示范围
    #[error("automaton is full: {0} entries exceed the 32-bit id space")]
    CapacityExceeded(usize),
}
