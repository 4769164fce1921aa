//! Maps an approved `PendingAction` to a concrete tool invocation and
//! transforms its payload into the shape that tool expects.

use crate::domain::errors::ExecutionError;
use crate::domain::models::PendingAction;
use crate::domain::ports::action_executor::ActionExecutor;
use crate::domain::ports::tool_transport::ToolTransport;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub struct ToolTransportActionExecutor {
    tools: Arc<dyn ToolTransport>,
}

impl ToolTransportActionExecutor {
    pub fn new(tools: Arc<dyn ToolTransport>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ActionExecutor for ToolTransportActionExecutor {
    async fn execute(&self, action: &PendingAction) -> Result<Value, ExecutionError> {
        let (tool, payload) = transform(action).ok_or_else(|| ExecutionError {
            action_id: action.id,
            message: format!("no tool mapping for action_type '{}'", action.action_type),
            status_code: None,
            response: None,
        })?;

        self.tools.invoke(tool, payload).await.map_err(|e| ExecutionError {
            action_id: action.id,
            message: e.to_string(),
            status_code: None,
            response: None,
        })
    }
}

fn transform(action: &PendingAction) -> Option<(&'static str, Value)> {
    let mut payload = action.payload.clone();
    let obj = payload.as_object_mut()?;
    obj.entry("reason").or_insert_with(|| Value::String(action.reasoning.clone()));

    let tool = match action.action_type.as_str() {
        "execute_custom_sql" => "execute_sql_query",
        "restock_item" | "urgent_restock" => {
            rename_key(obj, "quantity", "quantity_change");
            "update_inventory"
        }
        "update_inventory" | "adjust_stock" => "update_inventory",
        "pause_campaign" => {
            obj.insert("status".to_string(), Value::String("paused".to_string()));
            "update_campaign_status"
        }
        "resume_campaign" => {
            obj.insert("status".to_string(), Value::String("active".to_string()));
            "update_campaign_status"
        }
        "update_campaign_status" => "update_campaign_status",
        "adjust_budget" | "update_campaign_budget" => "update_campaign_budget",
        "escalate_ticket" => "escalate_ticket",
        "close_ticket" => "close_ticket",
        "prioritize_ticket" => "prioritize_ticket",
        _ => return None,
    };

    Some((tool, payload))
}

fn rename_key(obj: &mut serde_json::Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = obj.remove(from) {
        obj.entry(to.to_string()).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn action(action_type: &str, payload: Value) -> PendingAction {
        PendingAction {
            id: 1,
            agent: "inventory".to_string(),
            action_type: action_type.to_string(),
            payload,
            reasoning: "low stock".to_string(),
            status: crate::domain::models::PendingActionStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn restock_item_renames_quantity_to_quantity_change() {
        let a = action("restock_item", json!({"item_name": "widget", "quantity": 20}));
        let (tool, payload) = transform(&a).unwrap();
        assert_eq!(tool, "update_inventory");
        assert_eq!(payload["quantity_change"], 20);
        assert!(payload.get("quantity").is_none());
    }

    #[test]
    fn pause_campaign_injects_paused_status() {
        let a = action("pause_campaign", json!({"campaign_id": "42"}));
        let (tool, payload) = transform(&a).unwrap();
        assert_eq!(tool, "update_campaign_status");
        assert_eq!(payload["status"], "paused");
    }

    #[test]
    fn unknown_action_type_yields_none() {
        let a = action("teleport_inventory", json!({}));
        assert!(transform(&a).is_none());
    }

    #[test]
    fn reason_defaults_from_reasoning() {
        let a = action("escalate_ticket", json!({"ticket_id": "T1"}));
        let (_, payload) = transform(&a).unwrap();
        assert_eq!(payload["reason"], "low stock");
    }
}
