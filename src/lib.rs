pub mod config;
pub mod logging;
pub mod report;
pub mod rpc;
pub mod run;
pub mod script;
pub mod timeouts;
pub mod upstream;

#[cfg(test)]
mod test_support;
