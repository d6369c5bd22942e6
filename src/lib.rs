//! Import C/C++ build metadata from GN, Visual Studio and Code::Blocks into
//! one configuration-aware project model.

pub mod logging;
pub mod project;

#[cfg(test)]
mod test_utils;
