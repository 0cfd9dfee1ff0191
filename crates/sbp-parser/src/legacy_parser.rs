use sbp_core::{BlueprintError, BlueprintStep, Role};

use crate::normalize::{resolve_role, split_actions, split_flow};
use crate::step_builder::StepBuilder;

/// Parse a `step, flow, actions` line.
///
/// Only the first two commas split; the action field may contain more. The
/// shorter of the flow and action sequences is right-padded so they align,
/// and every adjacent pair is linked.
pub fn parse_legacy(line: &str) -> Result<BlueprintStep, BlueprintError> {
    let mut fields = line.splitn(3, ',').map(str::trim);
    let (Some(step), Some(flow), Some(actions)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(BlueprintError::MalformedLegacy {
            line: line.to_string(),
        });
    };

    let roles = split_flow(flow)
        .into_iter()
        .map(resolve_role)
        .collect::<Result<Vec<Role>, _>>()?;
    let actions = split_actions(actions);

    let mut builder = StepBuilder::new(step);
    for index in 0..roles.len().max(actions.len()) {
        let role = roles.get(index).copied();
        let action = actions.get(index).copied().unwrap_or_default();
        builder.push_slot(role, action);
    }
    builder.link_linear_chain();
    Ok(builder.finish())
}
