use std::sync::Arc;

use agrimap_core::community::{self, new_post, Author, PostCategory};
use agrimap_core::geometry::{centroid, estimate_hectares};
use agrimap_core::market::{self, ProductCategory, SortOrder};
use agrimap_core::planner::advance_stage;
use agrimap_core::recommend::custom_colors;
use agrimap_core::tasks::{agenda, new_task, NewTask, Priority, TaskKind};
use agrimap_core::{
    catalog, BoundaryCapture, CaptureEvent, ColorGenerator, Config, CropPlanner, Error, FarmStore,
    FileStore, MapLayers, Point, Recommendations, SeededColors, SystemClock,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct FarmRequest {
    /// ID of the farm (e.g. "farm-1")
    farm_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AddFarmRequest {
    /// Display name for the farm
    name: String,
    /// Boundary vertices in click order as {lat, lng} in decimal degrees. Clicking near the first vertex closes the ring; the ring is force-closed at 8 vertices and later points are ignored.
    points: Vec<Point>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct EstimateAreaRequest {
    /// Polygon vertices as {lat, lng}. The ring is closed implicitly.
    points: Vec<Point>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchCatalogRequest {
    /// Case-insensitive text matched against crop name and category. Omit to list everything.
    term: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct RecommendRequest {
    /// ID of the farm to size recommendations for
    farm_id: String,
    /// Catalog crop names to add alongside the built-in suggestions (see search_catalog)
    extra_crops: Option<Vec<String>>,
    /// Seed for random colours on the extra crops. Omit to use the fixed palette.
    color_seed: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AllocationItem {
    /// Recommendation ID, e.g. "wheat", "corn", "vegetables", or a catalog crop slug like "soybean"
    crop_id: String,
    /// Hectares to plant with this crop
    area: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetCropPlanRequest {
    /// ID of the farm
    farm_id: String,
    /// Allocations in layout order. The total must not exceed the farm's area.
    allocations: Vec<AllocationItem>,
    /// Catalog crop names used by the allocations beyond the built-in suggestions
    extra_crops: Option<Vec<String>>,
    /// Same value as passed to recommend_crops, so extra crops keep the colours shown there
    color_seed: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AdvanceStageRequest {
    /// ID of the farm
    farm_id: String,
    /// Crop in the farm's plan to move to its next stage (planned → sown → growing → harvested)
    crop_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListPostsRequest {
    /// Only posts of this kind: question, tip, success or problem
    category: Option<PostCategory>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CreatePostRequest {
    /// Text of the post; must not be blank
    content: String,
    /// question, tip, success or problem
    category: PostCategory,
    /// Display name of the poster (default "You")
    author: Option<String>,
    /// Where the poster farms, e.g. "Karnal, Haryana"
    location: Option<String>,
    /// Optional image path or URL
    image: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PostRequest {
    /// ID of the post (e.g. "post-3")
    post_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SearchMarketRequest {
    /// Case-insensitive text matched against product name and description
    query: Option<String>,
    /// fertilizer, pesticide or seeds
    category: Option<ProductCategory>,
    /// relevance (default), price-low, price-high, rating or distance
    sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AddTaskRequest {
    /// ID of the farm the task belongs to
    farm_id: String,
    /// irrigation, fertilization or pest-control
    kind: TaskKind,
    /// Short title, e.g. "Morning Irrigation - Zone A"
    title: String,
    description: Option<String>,
    /// High, Medium (default) or Low
    priority: Option<Priority>,
    /// Free text, e.g. "Today, 6:00 AM"
    due_date: Option<String>,
    /// Free text, e.g. "1.5 hours"
    estimated_time: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TaskRequest {
    /// ID of the farm
    farm_id: String,
    /// ID of the task (e.g. "task-2")
    task_id: String,
}

// --- Server ---

#[derive(Clone)]
pub struct AgrimapServer {
    store: FarmStore,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AgrimapServer {
    pub fn new(store: FarmStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all saved farms as JSON: [{id, name, area (hectares), center, createdAt}]")]
    fn list_farms(&self) -> Result<CallToolResult, McpError> {
        respond(self.list_farms_text())
    }

    #[tool(description = "Get one farm including its boundary points")]
    fn get_farm(
        &self,
        Parameters(req): Parameters<FarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.store.farm_or_err(&req.farm_id).map(|f| to_json(&f)))
    }

    #[tool(
        description = "Create a farm from boundary clicks. Points go through the same capture rules as the map: a click within 50 m of the first vertex (after at least two) closes the ring, and the ring closes itself at 8 vertices. At least 3 vertices are required. Returns the saved farm with its estimated area in hectares."
    )]
    fn add_farm(
        &self,
        Parameters(req): Parameters<AddFarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.add_farm_text(&req))
    }

    #[tool(description = "Delete a farm together with its crop plan and tasks")]
    fn delete_farm(
        &self,
        Parameters(req): Parameters<FarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.store
                .delete_farm(&req.farm_id)
                .map(|()| format!("Deleted farm '{}'", req.farm_id)),
        )
    }

    #[tool(
        description = "Estimate the area of a polygon in hectares without saving anything. The estimate uses a flat-earth scale that is only accurate near the equator."
    )]
    fn estimate_area(
        &self,
        Parameters(req): Parameters<EstimateAreaRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = serde_json::json!({
            "hectares": estimate_hectares(&req.points),
            "center": centroid(&req.points),
            "vertices": req.points.len(),
        });
        respond(Ok(to_json(&result)))
    }

    #[tool(description = "Search the crop reference catalog (season, sowing and harvest months, major states)")]
    fn search_catalog(
        &self,
        Parameters(req): Parameters<SearchCatalogRequest>,
    ) -> Result<CallToolResult, McpError> {
        let hits = catalog::search(req.term.as_deref().unwrap_or(""));
        if hits.is_empty() {
            return respond(Ok("No crops match.".to_string()));
        }
        respond(Ok(to_json(&hits)))
    }

    #[tool(
        description = "Crop recommendations sized to a farm: id, name, idealArea and maxArea in hectares, growth period, water need, profitability, colour. Pass extra_crops to include catalog crops."
    )]
    fn recommend_crops(
        &self,
        Parameters(req): Parameters<RecommendRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.recommend_text(&req))
    }

    #[tool(
        description = "Save the crop plan for a farm, replacing any previous one. Allocations that add up to more than the farm's area are rejected."
    )]
    fn set_crop_plan(
        &self,
        Parameters(req): Parameters<SetCropPlanRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.set_crop_plan_text(&req))
    }

    #[tool(description = "Get the saved crop plan for a farm")]
    fn get_crop_plan(
        &self,
        Parameters(req): Parameters<FarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.store.crop_plan(&req.farm_id).and_then(|plan| {
            plan.map(|p| to_json(&p)).ok_or_else(|| {
                Error::NotFound(format!("farm '{}' has no crop plan", req.farm_id))
            })
        });
        respond(result)
    }

    #[tool(description = "Move one crop of a farm's plan to its next lifecycle stage")]
    fn advance_crop_stage(
        &self,
        Parameters(req): Parameters<AdvanceStageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.advance_stage_text(&req))
    }

    #[tool(
        description = "Map layers for a farm: the boundary polygon, its center, and one rectangle per planned crop laid out inside the farm's bounding box. Zones are a display aid and do not follow the real boundary."
    )]
    fn get_map_layers(
        &self,
        Parameters(req): Parameters<FarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.map_layers_text(&req.farm_id))
    }

    #[tool(description = "Add a resource task (irrigation, fertilization or pest control) to a farm")]
    fn add_task(
        &self,
        Parameters(req): Parameters<AddTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.add_task_text(req))
    }

    #[tool(description = "List a farm's resource tasks: pending first, most urgent first")]
    fn list_tasks(
        &self,
        Parameters(req): Parameters<FarmRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.list_tasks_text(&req.farm_id))
    }

    #[tool(description = "Mark a resource task done, or back to pending if it is already done")]
    fn toggle_task(
        &self,
        Parameters(req): Parameters<TaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.store
                .toggle_task(&req.farm_id, &req.task_id, &SystemClock)
                .map(|t| to_json(&t)),
        )
    }

    #[tool(description = "Community feed, newest first. Filter by category to see only questions, tips, success stories or problems.")]
    fn list_posts(
        &self,
        Parameters(req): Parameters<ListPostsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.list_posts_text(req.category))
    }

    #[tool(description = "Publish a post to the community feed")]
    fn create_post(
        &self,
        Parameters(req): Parameters<CreatePostRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.create_post_text(req))
    }

    #[tool(description = "Like a post, or remove your like if you already liked it")]
    fn like_post(
        &self,
        Parameters(req): Parameters<PostRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.store.toggle_like(&req.post_id).map(|p| to_json(&p)))
    }

    #[tool(
        description = "Search the input marketplace (fertilizers, pesticides, seeds) with vendor contact, distance and stock"
    )]
    fn search_market(
        &self,
        Parameters(req): Parameters<SearchMarketRequest>,
    ) -> Result<CallToolResult, McpError> {
        let hits = market::search(
            req.query.as_deref().unwrap_or(""),
            req.category,
            req.sort.unwrap_or_default(),
        );
        if hits.is_empty() {
            return respond(Ok("No products match.".to_string()));
        }
        respond(Ok(to_json(&hits)))
    }
}

// --- Tool bodies ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FarmSummary<'a> {
    id: &'a str,
    name: &'a str,
    area: f64,
    center: Point,
    created_at: &'a str,
}

impl AgrimapServer {
    fn list_farms_text(&self) -> agrimap_core::Result<String> {
        let farms = self.store.list_farms()?;
        if farms.is_empty() {
            return Ok("No farms found. Use add_farm to create one.".to_string());
        }
        let summaries: Vec<FarmSummary> = farms
            .iter()
            .map(|f| FarmSummary {
                id: &f.id,
                name: &f.name,
                area: f.area,
                center: f.center,
                created_at: &f.created_at,
            })
            .collect();
        Ok(to_json(&summaries))
    }

    fn add_farm_text(&self, req: &AddFarmRequest) -> agrimap_core::Result<String> {
        let mut capture = BoundaryCapture::new();
        let mut ignored = 0;
        for p in &req.points {
            if capture.add_point(*p) == CaptureEvent::Rejected {
                ignored += 1;
            }
        }

        let mut ids = self.store.farm_ids()?;
        let farm = capture.to_farm(&req.name, &mut ids, &SystemClock)?;
        self.store.save_farm(&farm)?;

        let mut text = to_json(&farm);
        if ignored > 0 {
            warn!(farm = %farm.id, ignored, "points after boundary closed were ignored");
            text.push_str(&format!(
                "\n\n{} point(s) after the boundary closed were ignored.",
                ignored
            ));
        }
        Ok(text)
    }

    /// Built-in suggestions plus the named catalog crops. Also returns the
    /// names that were already listed and so left out.
    fn recommendations(
        &self,
        farm_area: f64,
        extra: Option<&[String]>,
        color_seed: Option<u64>,
    ) -> agrimap_core::Result<(Recommendations, Vec<String>)> {
        let mut recs = Recommendations::for_area(farm_area);
        let mut colors: Box<dyn ColorGenerator> = match color_seed {
            Some(seed) => Box::new(SeededColors::new(seed)),
            None => Box::new(custom_colors()),
        };
        let mut skipped = Vec::new();
        for name in extra.unwrap_or_default() {
            let crop = catalog::find(name).ok_or_else(|| {
                Error::Validation(format!("'{}' is not in the crop catalog", name))
            })?;
            if !recs.add_custom(crop, colors.as_mut()) {
                warn!(crop = crop.crop, "extra crop already listed, ignored");
                skipped.push(crop.crop.to_string());
            }
        }
        Ok((recs, skipped))
    }

    fn recommend_text(&self, req: &RecommendRequest) -> agrimap_core::Result<String> {
        let farm = self.store.farm_or_err(&req.farm_id)?;
        let (recs, skipped) =
            self.recommendations(farm.area, req.extra_crops.as_deref(), req.color_seed)?;
        Ok(to_json(&recs.into_items()) + &skipped_note(&skipped))
    }

    fn set_crop_plan_text(&self, req: &SetCropPlanRequest) -> agrimap_core::Result<String> {
        let farm = self.store.farm_or_err(&req.farm_id)?;
        let (recs, skipped) =
            self.recommendations(farm.area, req.extra_crops.as_deref(), req.color_seed)?;

        let mut planner = CropPlanner::new(&farm);
        for a in &req.allocations {
            planner.select(&a.crop_id, a.area);
        }
        let plan = planner.finalize(&recs, &SystemClock)?;
        self.store.save_crop_plan(&plan)?;
        Ok(to_json(&plan) + &skipped_note(&skipped))
    }

    fn advance_stage_text(&self, req: &AdvanceStageRequest) -> agrimap_core::Result<String> {
        let mut plan = self.store.crop_plan(&req.farm_id)?.ok_or_else(|| {
            Error::NotFound(format!("farm '{}' has no crop plan", req.farm_id))
        })?;
        let stage = advance_stage(&mut plan, &req.crop_id)?;
        self.store.save_crop_plan(&plan)?;
        Ok(format!("'{}' is now {}", req.crop_id, stage.as_str()))
    }

    fn map_layers_text(&self, farm_id: &str) -> agrimap_core::Result<String> {
        let farm = self.store.farm_or_err(farm_id)?;
        let plan = self.store.crop_plan(farm_id)?;
        Ok(to_json(&MapLayers::for_farm(&farm, plan.as_ref())))
    }

    fn add_task_text(&self, req: AddTaskRequest) -> agrimap_core::Result<String> {
        let spec = NewTask {
            kind: req.kind,
            title: req.title,
            description: req.description.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date.unwrap_or_default(),
            estimated_time: req.estimated_time.unwrap_or_default(),
        };
        let mut ids = self.store.task_ids(&req.farm_id)?;
        let task = new_task(&req.farm_id, spec, &mut ids)?;
        self.store.add_task(&task)?;
        Ok(to_json(&task))
    }

    fn list_tasks_text(&self, farm_id: &str) -> agrimap_core::Result<String> {
        self.store.farm_or_err(farm_id)?;
        let tasks = self.store.tasks(farm_id)?;
        if tasks.is_empty() {
            return Ok(format!("Farm '{}' has no tasks. Use add_task to create one.", farm_id));
        }
        Ok(to_json(&agenda(&tasks)))
    }

    fn list_posts_text(&self, category: Option<PostCategory>) -> agrimap_core::Result<String> {
        let posts = self.store.posts()?;
        let shown = community::filter(&posts, category);
        if shown.is_empty() {
            return Ok("No posts yet. Use create_post to start the conversation.".to_string());
        }
        Ok(to_json(&shown))
    }

    fn create_post_text(&self, req: CreatePostRequest) -> agrimap_core::Result<String> {
        let author = Author::local(req.author.as_deref(), req.location.as_deref());
        let mut ids = self.store.post_ids()?;
        let post = new_post(author, &req.content, req.category, req.image, &mut ids, &SystemClock)?;
        self.store.add_post(&post)?;
        Ok(to_json(&post))
    }
}

#[tool_handler]
impl ServerHandler for AgrimapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn to_json<T: Serialize + ?Sized>(val: &T) -> String {
    serde_json::to_string_pretty(val).unwrap_or_else(|e| format!("Serialization error: {}", e))
}

fn skipped_note(skipped: &[String]) -> String {
    if skipped.is_empty() {
        return String::new();
    }
    format!("\n\nAlready listed, ignored: {}.", skipped.join(", "))
}

/// Domain failures become tool errors the client can read, not protocol errors.
fn respond(result: agrimap_core::Result<String>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            warn!(error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

const INSTRUCTIONS: &str = r#"Agrimap stores farms drawn on a map and plans which crops to grow on them.

## Workflow
1. `add_farm` with a name and the boundary clicks. Use `estimate_area` first if you only want a size.
2. `recommend_crops` for the farm. Use `search_catalog` to find other crops and pass their names as `extra_crops`.
3. `set_crop_plan` with hectares per crop. The total may not exceed the farm's area.
4. `get_map_layers` to draw the farm and its crop zones.
5. `advance_crop_stage` as crops are sown, grow and are harvested.
6. `add_task`, `list_tasks` and `toggle_task` track irrigation, fertilization and pest control work per farm.

## Community and market
- `list_posts`, `create_post` and `like_post` run the farmers' feed.
- `search_market` finds fertilizers, pesticides and seeds from nearby vendors.

Areas are rough hectare estimates from a flat-earth scale; treat them as approximate."#;

fn init_logging() {
    // stdout carries the MCP stream, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_args(&args);
    info!(data_dir = %config.data_dir.display(), "starting agrimap-mcp");

    let store = FarmStore::new(Arc::new(FileStore::new(&config.data_dir)));
    let service = AgrimapServer::new(store)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
