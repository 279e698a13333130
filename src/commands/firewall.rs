//! Firewall group, rule and draft commands.

use tauri::State;

use crate::error::AppError;
use crate::firewall::rule::{self, RuleRow, SourceTypeOption};
use crate::firewall::{DraftEdit, GroupState, IpVersion, RuleDraft, RuleState};

use super::state::AppState;

/// Groups from the store, refetched from the API when `refresh` is set.
#[tauri::command]
pub async fn list_groups(state: State<'_, AppState>, refresh: bool) -> Result<Vec<GroupState>, AppError> {
    if refresh {
        return state.service.refresh_groups().await;
    }
    Ok(state.service.store().groups())
}

#[tauri::command]
pub async fn get_group(state: State<'_, AppState>, id: String) -> Result<GroupState, AppError> {
    state.service.refresh_group(&id).await
}

#[tauri::command]
pub async fn create_group(state: State<'_, AppState>, description: String) -> Result<GroupState, AppError> {
    state.service.create_group(&description).await
}

#[tauri::command]
pub fn set_new_description(state: State<'_, AppState>, id: String, description: String) -> Result<(), AppError> {
    if !state.service.store().set_new_description(&id, &description) {
        return Err(unknown_group(&id));
    }
    Ok(())
}

#[tauri::command]
pub async fn update_description(
    state: State<'_, AppState>,
    id: String,
    description: String,
) -> Result<(), AppError> {
    state.service.update_description(&id, &description).await
}

#[tauri::command]
pub async fn delete_group(state: State<'_, AppState>, id: String) -> Result<(), AppError> {
    state.service.delete_group(&id).await
}

#[tauri::command]
pub async fn list_rules(
    state: State<'_, AppState>,
    group_id: String,
    refresh: bool,
) -> Result<Vec<RuleRow>, AppError> {
    let rules = if refresh {
        state.service.refresh_rules(&group_id).await?
    } else {
        state.service.store().rules(&group_id)
    };
    Ok(rules.into_iter().map(RuleRow::from).collect())
}

#[tauri::command]
pub fn get_new_rule(
    state: State<'_, AppState>,
    group_id: String,
    version: IpVersion,
) -> Result<RuleDraft, AppError> {
    state
        .service
        .store()
        .new_rule(&group_id, version)
        .ok_or_else(|| unknown_group(&group_id))
}

/// Apply one form edit to the draft of `version` and return the updated draft.
#[tauri::command]
pub fn edit_new_rule(
    state: State<'_, AppState>,
    group_id: String,
    version: IpVersion,
    edit: DraftEdit,
) -> Result<RuleDraft, AppError> {
    let store = state.service.store();
    let mut draft = store
        .new_rule(&group_id, version)
        .ok_or_else(|| unknown_group(&group_id))?;
    draft.apply(edit, &state.detected_ips())?;
    store.set_new_rule(&group_id, draft.clone());
    Ok(draft)
}

#[tauri::command]
pub fn reset_new_rule(state: State<'_, AppState>, group_id: String, version: IpVersion) -> Result<RuleDraft, AppError> {
    let store = state.service.store();
    if !store.reset_new_rule(&group_id, version) {
        return Err(unknown_group(&group_id));
    }
    Ok(RuleDraft::initial(version))
}

#[tauri::command]
pub fn get_source_type_options(
    state: State<'_, AppState>,
    version: IpVersion,
) -> Result<Vec<SourceTypeOption>, AppError> {
    Ok(rule::source_type_options(version, &state.detected_ips()))
}

#[tauri::command]
pub async fn create_rule(
    state: State<'_, AppState>,
    group_id: String,
    version: IpVersion,
) -> Result<RuleState, AppError> {
    state.service.create_rule(&group_id, version).await
}

#[tauri::command]
pub async fn delete_rule(state: State<'_, AppState>, group_id: String, rule_id: u64) -> Result<(), AppError> {
    state.service.delete_rule(&group_id, rule_id).await
}

fn unknown_group(id: &str) -> AppError {
    AppError::InvalidInput(format!("Unknown firewall group {id}"))
}
