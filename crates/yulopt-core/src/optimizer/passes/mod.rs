mod call_site_rewriter;
pub use call_site_rewriter::CallSiteRewriter;

mod function_splitter;
pub use function_splitter::{split_function, SplitFunction};

mod unused_function_parameter_pruner;
pub use unused_function_parameter_pruner::UnusedFunctionParameterPrunerPass;
