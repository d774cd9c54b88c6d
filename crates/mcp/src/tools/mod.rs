pub mod estimate;
pub mod trace;
mod registry;

pub use estimate::{EstimatePriceTool, EstimateTimeTool, EstimateTimeWithLogisticTool};
pub use registry::{
    json_schema_object, json_schema_string, json_schema_string_with_default, parse_arguments,
    Tool, ToolError, ToolRegistry,
};
pub use trace::QueryTraceTool;

use kuaidi100_sdk::Kuaidi100Client;
use std::sync::Arc;

/// Register the four Kuaidi100 tools against one shared client.
pub fn register_kuaidi100_tools(registry: &mut ToolRegistry, client: Arc<Kuaidi100Client>) {
    registry.register(Arc::new(QueryTraceTool::new(client.clone())));
    registry.register(Arc::new(EstimateTimeTool::new(client.clone())));
    registry.register(Arc::new(EstimateTimeWithLogisticTool::new(client.clone())));
    registry.register(Arc::new(EstimatePriceTool::new(client)));
}
