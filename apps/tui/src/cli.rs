use clap::Parser;
use tvmap::config::settings::{
    DATA_VAR, FILTERS_VAR, MAP_DIR_VAR, PROVINCE_MATCH_VAR, REGION_KEYS_VAR,
};
use tvmap_core::Action;

#[derive(Debug, Parser)]
#[command(name = "tvmap", version, about = "Hotel TV supply map")]
pub struct CliArgs {
    /// Print the dashboard views and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless views as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the dataset file
    #[arg(long, value_name = "PATH")]
    pub data: Option<String>,

    /// Override the filter vocabulary file
    #[arg(long, value_name = "PATH")]
    pub filters: Option<String>,

    /// Override the map asset directory
    #[arg(long = "map-dir", value_name = "PATH")]
    pub map_dir: Option<String>,

    /// Override the province name to map key table
    #[arg(long = "region-keys", value_name = "PATH")]
    pub region_keys: Option<String>,

    /// Province matching: suffix or lookup
    #[arg(long = "match", value_name = "MODE")]
    pub province_match: Option<String>,

    /// Brand filter applied before printing (headless)
    #[arg(long)]
    pub brand: Option<String>,

    /// Model filter applied before printing (headless)
    #[arg(long)]
    pub model: Option<String>,

    /// Province to drill into before printing (headless)
    #[arg(long)]
    pub province: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        let overrides = [
            (DATA_VAR, &self.data),
            (FILTERS_VAR, &self.filters),
            (MAP_DIR_VAR, &self.map_dir),
            (REGION_KEYS_VAR, &self.region_keys),
            (PROVINCE_MATCH_VAR, &self.province_match),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                std::env::set_var(name, value);
            }
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// The filter flags as dashboard actions, brand first so a province
    /// drill-down sees the narrowed brand and model.
    pub fn filter_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(brand) = &self.brand {
            actions.push(Action::ChooseBrand(brand.clone()));
        }
        if let Some(model) = &self.model {
            actions.push(Action::ChooseModel(model.clone()));
        }
        if let Some(province) = &self.province {
            actions.push(Action::ChooseProvince(province.clone()));
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_flags() {
        let args = CliArgs::parse_from([
            "tvmap",
            "--headless",
            "--json",
            "--brand",
            "A",
            "--province",
            "广东",
            "--match",
            "lookup",
        ]);

        assert!(args.headless);
        assert!(args.json);
        assert_eq!(args.brand.as_deref(), Some("A"));
        assert_eq!(args.province.as_deref(), Some("广东"));
        assert_eq!(args.province_match.as_deref(), Some("lookup"));
        assert!(args.model.is_none());
    }

    #[test]
    fn filter_flags_become_actions_in_order() {
        let args = CliArgs::parse_from(["tvmap", "--province", "广东", "--model", "55X"]);

        assert_eq!(
            args.filter_actions(),
            vec![
                Action::ChooseModel("55X".into()),
                Action::ChooseProvince("广东".into()),
            ]
        );
        assert!(CliArgs::parse_from(["tvmap"]).filter_actions().is_empty());
    }
}
