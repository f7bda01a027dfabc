pub mod catalog;
pub mod dispatch;
pub mod import;
pub mod preview;
pub mod results;
pub mod rollup;
pub mod run;
pub mod runs;
pub mod schema;
pub mod shared;
