use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::PathBuf;

use tinet::command::node::list_nodes;
use tinet::compiler::{CompileError, CompileOptions, Compiler, Diagnostics, UnitPolicy};
use tinet::config_loader::load_config;
use tinet::script::{write_script, OutputFormat, Phase, Script};
use tinet::template::generate_template;
use tinet::topology::HandlePolicy;

/// Generate shell scripts that build virtual network topologies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology YAML file
    #[arg(short, long, global = true, default_value = "spec.yaml")]
    config: PathBuf,

    /// Write the script to this file (mode 0755) instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Script output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Precede each phase with a `# <phase>` comment line
    #[arg(long, global = true)]
    annotate: bool,

    /// Leave out nodes, interfaces and configs that fail to compile
    #[arg(long, global = true)]
    skip_invalid: bool,

    /// Delete a container's netns handle right after moving a veth/phys
    /// device into it
    #[arg(long, global = true)]
    release_netns_handle: bool,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Cmd {
    #[command(flatten)]
    Script(ScriptCmd),
    /// List running containers and namespaces
    Ps {
        /// Include stopped containers
        #[arg(short, long)]
        all: bool,
    },
    /// Print a sample topology file
    Init,
    /// Validate the topology and compile every script without printing it
    Check,
}

/// Subcommands that compile the topology into a script
#[derive(Subcommand, Debug, Clone, PartialEq)]
enum ScriptCmd {
    /// Create switches and nodes and wire all links
    Up,
    /// Remove all nodes and switches
    Down,
    /// Run node configs inside their nodes
    Conf,
    /// Tear down and bring up again
    Reup,
    /// Tear down, bring up and configure again
    Reconf,
    /// Run the topology tests
    Test {
        /// Only run the test with this name
        name: Option<String>,
    },
    /// Pull the images of all container nodes
    Pull,
    /// Run a command inside a node
    Exec {
        /// Node name
        node: String,
        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        cmd: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Logs go to stderr; stdout carries only the script
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let script = match &args.command {
        Cmd::Init => return emit(&args, generate_template()?),
        Cmd::Ps { all } => {
            let mut script = Script::default();
            script.push(Phase::Status, list_nodes(*all));
            script
        }
        Cmd::Check => {
            let topology = load_config(&args.config)?;
            return check(&Compiler::with_options(&topology, compile_options(&args)));
        }
        Cmd::Script(command) => {
            let topology = load_config(&args.config)?;
            let compiler = Compiler::with_options(&topology, compile_options(&args));

            debug!("Compiling {:?} for {:?}", command, args.config);
            compile(&compiler, command)
                .wrap_err_with(|| format!("Failed to compile '{}'", args.config.display()))?
        }
    };

    report(&script.diagnostics);
    emit_script(&args, &script)
}

fn compile_options(args: &Args) -> CompileOptions {
    CompileOptions {
        on_error: if args.skip_invalid {
            UnitPolicy::Skip
        } else {
            UnitPolicy::Abort
        },
        handle_policy: if args.release_netns_handle {
            HandlePolicy::Release
        } else {
            HandlePolicy::Keep
        },
    }
}

fn compile(compiler: &Compiler<'_>, command: &ScriptCmd) -> Result<Script, CompileError> {
    match command {
        ScriptCmd::Up => compiler.up(),
        ScriptCmd::Down => compiler.down(),
        ScriptCmd::Conf => compiler.conf(),
        ScriptCmd::Reup => compiler.reup(),
        ScriptCmd::Reconf => compiler.reconf(),
        ScriptCmd::Test { name } => compiler.test_script(name.as_deref()),
        ScriptCmd::Pull => Ok(compiler.pull_script()),
        ScriptCmd::Exec { node, cmd } => compiler.exec_script(node, cmd),
    }
}

/// Compile every script once, report diagnostics, fail on any error
fn check(compiler: &Compiler<'_>) -> Result<()> {
    let mut diagnostics = Diagnostics::default();
    let mut failures = 0;

    for (name, result) in [
        ("up", compiler.up()),
        ("down", compiler.down()),
        ("conf", compiler.conf()),
        ("test", compiler.test_script(None)),
    ] {
        match result {
            Ok(script) => diagnostics.extend(&script.diagnostics),
            Err(err) => {
                error!("{}: {}", name, err);
                failures += 1;
            }
        }
    }

    report(&diagnostics);

    if failures > 0 || diagnostics.skipped_units().next().is_some() {
        return Err(eyre!("Topology check failed"));
    }
    info!(
        "Topology OK: {} nodes, {} switches",
        compiler.topology().nodes.len(),
        compiler.topology().switches.len()
    );
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.warnings() {
        warn!("{}", diagnostic);
    }
    for diagnostic in diagnostics.skipped_units() {
        error!("{}", diagnostic);
    }
}

fn emit_script(args: &Args, script: &Script) -> Result<()> {
    let rendered = script.render(args.format.into(), args.annotate)?;
    emit(args, rendered)
}

fn emit(args: &Args, content: String) -> Result<()> {
    match &args.output {
        Some(path) => {
            write_script(path, &content)?;
            info!("Wrote {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .wrap_err("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
