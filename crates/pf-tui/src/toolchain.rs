//! Spawning external programs.

use std::process::Command;

use camino::Utf8Path;

/// A command for `program` that runs in `working_dir`.
#[allow(clippy::disallowed_methods)]
pub fn command(program: &str, working_dir: &Utf8Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.current_dir(working_dir.as_std_path());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_working_dir() {
        let cmd = command("true", Utf8Path::new("/tmp"));
        assert_eq!(cmd.get_program(), "true");
        assert_eq!(cmd.get_current_dir(), Some(std::path::Path::new("/tmp")));
    }
}
