use crate::config::Topology;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, warn};
use std::path::Path;

/// Load, parse and validate a topology from a YAML file
pub fn load_config(config_path: &Path) -> Result<Topology> {
    debug!("Loading topology from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)
        .wrap_err_with(|| format!("Failed to read topology file '{}'", config_path.display()))?;

    check_config_compatibility(&content);

    let topology = parse_config(&content)
        .wrap_err_with(|| format!("Invalid topology file '{}'", config_path.display()))?;

    debug!(
        "Loaded {} nodes, {} switches, {} node configs, {} tests",
        topology.nodes.len(),
        topology.switches.len(),
        topology.node_configs.len(),
        topology.test.len()
    );

    Ok(topology)
}

/// Parse and validate a topology from YAML text
pub fn parse_config(content: &str) -> Result<Topology> {
    let topology: Topology = serde_yaml::from_str(content)?;
    topology.validate()?;
    Ok(topology)
}

/// Warn about deprecated spellings that still load
pub fn check_config_compatibility(content: &str) -> bool {
    let legacy_sysctl = uses_legacy_sysctl_key(content);

    if legacy_sysctl {
        warn!("Topology uses the legacy 'string:' key for sysctls. \
              Please rename it to 'sysctl:'.");
    }

    legacy_sysctl
}

/// Whether a `string:` key appears inside a `sysctls:` block
fn uses_legacy_sysctl_key(content: &str) -> bool {
    // Indentation of the enclosing `sysctls:` key, while inside its block
    let mut sysctls_indent: Option<usize> = None;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();

        // Items of a block sequence may sit at the same indent as their key
        let leaves_block = |outer: usize| {
            indent < outer || (indent == outer && !trimmed.starts_with("- "))
        };
        if sysctls_indent.is_some_and(leaves_block) {
            sysctls_indent = None;
        }

        let key = trimmed.trim_start_matches("- ");
        if let Some(rest) = key.strip_prefix("sysctls:") {
            if rest.contains("string:") {
                return true;
            }
            sysctls_indent = Some(indent);
            continue;
        }

        let entry = key.trim_start_matches('{').trim_start();
        if sysctls_indent.is_some() && entry.starts_with("string:") {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
nodes:
  - name: R1
    image: slankdev/ubuntu:18.04
    interfaces:
      - { name: net0, type: bridge, args: B0 }
switches:
  - name: B0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let topology = load_config(temp_file.path()).unwrap();
        assert_eq!(topology.nodes[0].name, "R1");
        assert_eq!(topology.switches[0].name, "B0");
    }

    #[test]
    fn test_load_rejects_duplicate_nodes() {
        let yaml = r#"
nodes:
  - { name: R1, image: x }
  - { name: R1, image: y }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(format!("{:?}", err).contains("Duplicate node name 'R1'"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("/nonexistent/tinet/spec.yaml")).is_err());
    }

    #[test]
    fn test_legacy_sysctl_detection() {
        assert!(check_config_compatibility("sysctls:\n  - string: net.ipv4.ip_forward=1\n"));
        assert!(!check_config_compatibility("sysctls:\n  - sysctl: net.ipv4.ip_forward=1\n"));

        let nested = r#"
nodes:
  - name: R1
    sysctls:
    - string: net.ipv4.ip_forward=1
"#;
        assert!(check_config_compatibility(nested));

        let flow = "nodes:\n  - name: R1\n    sysctls: [{ string: net.ipv4.ip_forward=1 }]\n";
        assert!(check_config_compatibility(flow));
    }

    #[test]
    fn test_string_key_outside_sysctls_is_not_legacy() {
        let yaml = r#"
nodes:
  - name: R1
    sysctls:
      - sysctl: net.ipv4.ip_forward=1
    labels:
      - string: not-a-sysctl
  - name: R2
    string: unrelated
"#;
        assert!(!check_config_compatibility(yaml));
    }
}
