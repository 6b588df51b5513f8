//! One module per subcommand, each exposing `execute`.

pub mod export;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod keygen;
pub mod list;
pub mod rm;
pub mod run;
pub mod set;
