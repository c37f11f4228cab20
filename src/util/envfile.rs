use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

fn parse_env_content(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        if let Some(eq) = s.find('=') {
            let key = s[..eq].trim();
            let mut val = s[eq + 1..].trim().to_string();
            // Remove surrounding quotes if present
            if val.len() >= 2
                && ((val.starts_with('"') && val.ends_with('"'))
                    || (val.starts_with('\'') && val.ends_with('\'')))
            {
                val = val[1..val.len() - 1].to_string();
            }
            map.insert(key.to_string(), val);
        } else {
            log::warn!("ignoring .env line {} without '=': {}", idx + 1, line);
        }
    }
    map
}

/// Parse a .env file, if present. Does not modify the process environment.
pub fn parse_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_env_content(&content))
}

/// Load `.env` from the current working directory into the process environment
/// (non-destructive: does not override existing vars).
pub fn load_dotenv_if_present() -> Result<()> {
    for (k, v) in parse_env_file(Path::new(".env"))? {
        if std::env::var_os(&k).is_none() {
            unsafe {
                std::env::set_var(&k, &v);
            }
        }
    }
    Ok(())
}

/// Generate a .env.template file with placeholder values and comments.
pub fn write_env_template(path: &str) -> Result<()> {
    let mut f = fs::File::create(path)?;
    let template = r#"# user_mac_mapper environment configuration template
# Copy this file to .env and adjust. Variables already set in the
# environment take precedence over this file.

# Input files
USER_MAC_MAPPER_OLD=old.csv
USER_MAC_MAPPER_MAGS=mags.csv
USER_MAC_MAPPER_NEW=new.csv

# Output (map command)
#USER_MAC_MAPPER_OUT=user_mac_mapping.csv
#USER_MAC_MAPPER_SUMMARY=user_mac_mapping_summary.csv

# flat | template
#USER_MAC_MAPPER_SHAPE=flat
# passthrough | base64
#USER_MAC_MAPPER_MAC_DECODING=passthrough

# Column names (defaults shown)
#USER_MAC_MAPPER_OLD_ID_COL=id
#USER_MAC_MAPPER_OLD_USERNAME_COL=username
#USER_MAC_MAPPER_MAC_USER_ID_COL=user_id
#USER_MAC_MAPPER_MAC_COL=mac
#USER_MAC_MAPPER_NEW_ID_COL=id
#USER_MAC_MAPPER_NEW_USERNAME_COL=username

# Logging
#RUST_LOG=info
"#;
    f.write_all(template.as_bytes())?;
    Ok(())
}
