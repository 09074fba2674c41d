mod token;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use token::{Attribute, Token};
pub use tokenizer::HTMLTokenizer;
