//! Generated scripts.
//!
//! A [`Script`] is the ordered list of phases a subcommand produced. It is
//! rendered either as plain shell (one command per line, meant to be piped
//! into `sh`) or as JSON for tooling. All commands of a script run in one
//! shell, which the namespace-mount block relies on.

use crate::command::Command;
use crate::compiler::Diagnostics;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// One ordered stage of a generated script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[serde(rename = "precmd")]
    PreCmd,
    #[serde(rename = "preinit")]
    PreInit,
    Pull,
    CreateSwitches,
    CreateNodes,
    MountNetns,
    WireLinks,
    #[serde(rename = "postinit")]
    PostInit,
    Configure,
    Test,
    Delete,
    #[serde(rename = "postfini")]
    PostFini,
    Exec,
    Status,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreCmd => "precmd",
            Phase::PreInit => "preinit",
            Phase::Pull => "pull",
            Phase::CreateSwitches => "create-switches",
            Phase::CreateNodes => "create-nodes",
            Phase::MountNetns => "mount-netns",
            Phase::WireLinks => "wire-links",
            Phase::PostInit => "postinit",
            Phase::Configure => "configure",
            Phase::Test => "test",
            Phase::Delete => "delete",
            Phase::PostFini => "postfini",
            Phase::Exec => "exec",
            Phase::Status => "status",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands of one phase, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseCommands {
    pub phase: Phase,
    pub commands: Vec<Command>,
}

/// Output format of a rendered script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// An ordered sequence of phases plus the diagnostics raised building it
#[derive(Debug, Clone, Default, Serialize)]
pub struct Script {
    pub phases: Vec<PhaseCommands>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl Script {
    /// Append a phase. Empty phases are dropped.
    pub fn push(&mut self, phase: Phase, commands: Vec<Command>) {
        if !commands.is_empty() {
            self.phases.push(PhaseCommands { phase, commands });
        }
    }

    /// Commands of the first phase named `phase`
    pub fn phase(&self, phase: Phase) -> Option<&[Command]> {
        self.phases
            .iter()
            .find(|p| p.phase == phase)
            .map(|p| p.commands.as_slice())
    }

    /// All commands in execution order
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.phases.iter().flat_map(|p| p.commands.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Render as shell, optionally with a `# <phase>` line before each phase
    pub fn to_text(&self, annotate: bool) -> String {
        let mut out = String::new();
        for phase in &self.phases {
            if annotate {
                out.push_str(&format!("# {}\n", phase.phase));
            }
            for cmd in &phase.commands {
                out.push_str(&cmd.to_shell());
                out.push('\n');
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render(&self, format: OutputFormat, annotate: bool) -> serde_json::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text(annotate)),
            OutputFormat::Json => self.to_json().map(|mut json| {
                json.push('\n');
                json
            }),
        }
    }
}

/// Write a rendered script to `path` and make it executable
pub fn write_script(path: &Path, content: &str) -> color_eyre::eyre::Result<()> {
    std::fs::write(path, content)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write script {:?}: {}", path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
