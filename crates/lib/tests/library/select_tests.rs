use cordbuild_lib::config::Mode;
use cordbuild_lib::consts::SCRIPTS_TARGET;
use cordbuild_lib::registry::TargetRegistry;
use cordbuild_lib::select::select_targets;

use super::common::TestWorkspace;

#[test]
fn unknown_names_are_dropped_with_the_rest_selected() {
  let ws = TestWorkspace::new();
  let registry = TargetRegistry::for_config(&ws.config(Mode::Production)).unwrap();

  let selection = select_targets(Some("server,bar"), &registry);

  assert_eq!(selection.names, vec!["server"]);
  assert_eq!(selection.unknown, vec!["bar"]);
}

#[test]
fn default_selection_has_scripts_but_not_their_aggregate() {
  let ws = TestWorkspace::new();
  ws.write_file("scripts/seed.ts", "");
  ws.write_file("ops/aws/scripts/rotate.ts", "");
  let registry = TargetRegistry::for_config(&ws.config(Mode::Production)).unwrap();

  let selection = select_targets(None, &registry);

  assert!(selection.names.contains(&"scripts/seed.ts".to_string()));
  assert!(selection.names.contains(&"ops/aws/scripts/rotate.ts".to_string()));
  assert!(selection.names.contains(&"server".to_string()));
  assert!(!selection.names.contains(&SCRIPTS_TARGET.to_string()));
}

#[test]
fn scripts_aggregate_can_be_requested() {
  let ws = TestWorkspace::new();
  ws.write_file("scripts/seed.ts", "");
  let registry = TargetRegistry::for_config(&ws.config(Mode::Production)).unwrap();

  let selection = select_targets(Some("scripts"), &registry);

  assert_eq!(selection.names, vec![SCRIPTS_TARGET]);
  assert_eq!(registry.get(SCRIPTS_TARGET).unwrap().leaf_count(), 1);
}
