use crate::config::{AppConfig, DEFAULT_OUT_PATH, InputConfig, MacConfig, OutputConfig};
use crate::error::ConfigError;
use crate::models::{ColumnMapping, MacDecoding, OutputShape};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "user_mac_mapper",
    version,
    about = "Carry device MAC addresses from old user ids to new user ids",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile the three files and write the mapping CSV
    Map {
        #[command(flatten)]
        inputs: InputArgs,
        /// Output path (env: USER_MAC_MAPPER_OUT)
        #[arg(short, long, env = "USER_MAC_MAPPER_OUT", default_value = DEFAULT_OUT_PATH)]
        out: String,
        /// Also write a Key/Value run summary CSV here
        #[arg(long, env = "USER_MAC_MAPPER_SUMMARY")]
        summary: Option<String>,
    },
    /// Reconcile the three files and print a JSON preview
    Preview {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Print statistics for an existing flat mapping file
    Verify {
        /// Mapping CSV produced by `map`
        #[arg(value_name = "REPORT")]
        report: String,
    },
    /// Generate a .env.template
    EnvTemplate {
        #[arg(value_name = "PATH", default_value = ".env.template")]
        path: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Old users CSV (id, username) (env: USER_MAC_MAPPER_OLD)
    #[arg(value_name = "OLD", env = "USER_MAC_MAPPER_OLD")]
    pub old: String,
    /// MAC records CSV (user_id, mac) (env: USER_MAC_MAPPER_MAGS)
    #[arg(value_name = "MAGS", env = "USER_MAC_MAPPER_MAGS")]
    pub mags: String,
    /// New users CSV (id, username) (env: USER_MAC_MAPPER_NEW)
    #[arg(value_name = "NEW", env = "USER_MAC_MAPPER_NEW")]
    pub new: String,
    /// Output shape
    #[arg(long, value_enum, env = "USER_MAC_MAPPER_SHAPE", default_value_t = OutputShape::Flat)]
    pub shape: OutputShape,
    /// How the MAC column is stored
    #[arg(
        long = "mac-decoding",
        value_enum,
        env = "USER_MAC_MAPPER_MAC_DECODING",
        default_value_t = MacDecoding::Passthrough
    )]
    pub mac_decoding: MacDecoding,
    /// Old users: id column
    #[arg(long = "old-id-col", env = "USER_MAC_MAPPER_OLD_ID_COL", default_value = "id")]
    pub old_id_col: String,
    /// Old users: username column
    #[arg(long = "old-username-col", env = "USER_MAC_MAPPER_OLD_USERNAME_COL", default_value = "username")]
    pub old_username_col: String,
    /// MAC records: old user id column
    #[arg(long = "mac-user-id-col", env = "USER_MAC_MAPPER_MAC_USER_ID_COL", default_value = "user_id")]
    pub mac_user_id_col: String,
    /// MAC records: address column
    #[arg(long = "mac-col", env = "USER_MAC_MAPPER_MAC_COL", default_value = "mac")]
    pub mac_col: String,
    /// New users: id column
    #[arg(long = "new-id-col", env = "USER_MAC_MAPPER_NEW_ID_COL", default_value = "id")]
    pub new_id_col: String,
    /// New users: username column
    #[arg(long = "new-username-col", env = "USER_MAC_MAPPER_NEW_USERNAME_COL", default_value = "username")]
    pub new_username_col: String,
}

impl InputArgs {
    pub fn to_app_config(
        &self,
        out_path: Option<&str>,
        summary_path: Option<&str>,
    ) -> Result<AppConfig, ConfigError> {
        let cfg = AppConfig {
            inputs: InputConfig {
                old_path: self.old.clone(),
                mags_path: self.mags.clone(),
                new_path: self.new.clone(),
            },
            columns: ColumnMapping {
                old_id: self.old_id_col.clone(),
                old_username: self.old_username_col.clone(),
                mac_user_id: self.mac_user_id_col.clone(),
                mac: self.mac_col.clone(),
                new_id: self.new_id_col.clone(),
                new_username: self.new_username_col.clone(),
            },
            output: OutputConfig {
                out_path: out_path.unwrap_or(DEFAULT_OUT_PATH).to_string(),
                shape: self.shape,
                summary_path: summary_path.map(|s| s.to_string()),
            },
            mac: MacConfig {
                decoding: self.mac_decoding,
            },
        };
        match out_path {
            Some(_) => cfg.validate_for_output()?,
            None => cfg.validate()?,
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_parses_with_defaults() {
        let cli = Cli::try_parse_from(["user_mac_mapper", "map", "old.csv", "mags.csv", "new.csv"])
            .unwrap();
        let Command::Map { inputs, out, summary } = cli.command else {
            panic!("expected map");
        };
        assert_eq!(inputs.shape, OutputShape::Flat);
        assert_eq!(inputs.mac_col, "mac");
        assert_eq!(summary, None);
        let cfg = inputs.to_app_config(Some(&out), None).unwrap();
        assert_eq!(cfg.output.out_path, DEFAULT_OUT_PATH);
        assert_eq!(cfg.columns, ColumnMapping::default());
    }

    #[test]
    fn preview_accepts_template_and_base64() {
        let cli = Cli::try_parse_from([
            "user_mac_mapper",
            "preview",
            "o.csv",
            "m.csv",
            "n.csv",
            "--shape",
            "template",
            "--mac-decoding",
            "base64",
            "--mac-user-id-col",
            "owner",
        ])
        .unwrap();
        let Command::Preview { inputs } = cli.command else {
            panic!("expected preview");
        };
        let cfg = inputs.to_app_config(None, None).unwrap();
        assert_eq!(cfg.output.shape, OutputShape::Template);
        assert_eq!(cfg.mac.decoding, MacDecoding::Base64);
        assert_eq!(cfg.columns.mac_user_id, "owner");
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let r = Cli::try_parse_from([
            "user_mac_mapper",
            "map",
            "o.csv",
            "m.csv",
            "n.csv",
            "--shape",
            "wide",
        ]);
        assert!(r.is_err());
    }
}
