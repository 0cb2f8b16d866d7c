//! Farm and crop plan records on top of a [`KvStore`].
//!
//! Layout:
//!
//! ```text
//! farms                → [Farm, ...]
//! cropPlan_{farmId}    → CropPlan
//! tasks_{farmId}       → [ResourceTask, ...]
//! posts                → [Post, ...] (newest first)
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::community::Post;
use crate::generate::{Clock, SequentialIds};
use crate::kv::KvStore;
use crate::tasks::ResourceTask;
use crate::{CropPlan, Error, Farm, Result};

pub const FARMS_KEY: &str = "farms";
pub const CROP_PLAN_PREFIX: &str = "cropPlan_";
pub const TASKS_PREFIX: &str = "tasks_";
pub const POSTS_KEY: &str = "posts";

pub fn crop_plan_key(farm_id: &str) -> String {
    format!("{}{}", CROP_PLAN_PREFIX, farm_id)
}

pub fn tasks_key(farm_id: &str) -> String {
    format!("{}{}", TASKS_PREFIX, farm_id)
}

#[derive(Clone)]
pub struct FarmStore {
    kv: Arc<dyn KvStore>,
}

impl FarmStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| Error::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.kv.set(key, &serde_json::to_string(value)?)
    }

    // --- Farms ---

    pub fn list_farms(&self) -> Result<Vec<Farm>> {
        Ok(self.read(FARMS_KEY)?.unwrap_or_default())
    }

    pub fn get_farm(&self, id: &str) -> Result<Option<Farm>> {
        Ok(self.list_farms()?.into_iter().find(|f| f.id == id))
    }

    /// Get a farm or return NotFound.
    pub fn farm_or_err(&self, id: &str) -> Result<Farm> {
        self.get_farm(id)?
            .ok_or_else(|| Error::NotFound(format!("farm '{}' not found", id)))
    }

    /// ID generator that continues after the farms already stored.
    pub fn farm_ids(&self) -> Result<SequentialIds> {
        let farms = self.list_farms()?;
        Ok(SequentialIds::after("farm", farms.iter().map(|f| f.id.as_str())))
    }

    /// Insert or replace a farm by id.
    pub fn save_farm(&self, farm: &Farm) -> Result<()> {
        let mut farms = self.list_farms()?;
        match farms.iter_mut().find(|f| f.id == farm.id) {
            Some(existing) => *existing = farm.clone(),
            None => farms.push(farm.clone()),
        }
        self.write(FARMS_KEY, &farms)?;
        info!(farm = %farm.id, area_ha = farm.area, "farm saved");
        Ok(())
    }

    /// Delete a farm with its crop plan and tasks.
    pub fn delete_farm(&self, id: &str) -> Result<()> {
        let mut farms = self.list_farms()?;
        let before = farms.len();
        farms.retain(|f| f.id != id);
        if farms.len() == before {
            return Err(Error::NotFound(format!("farm '{}' not found", id)));
        }
        self.write(FARMS_KEY, &farms)?;
        self.kv.remove(&crop_plan_key(id))?;
        self.kv.remove(&tasks_key(id))?;
        info!(farm = %id, "farm deleted");
        Ok(())
    }

    // --- Crop plans ---

    pub fn crop_plan(&self, farm_id: &str) -> Result<Option<CropPlan>> {
        let key = crop_plan_key(farm_id);
        debug!(%key, "reading crop plan");
        self.read(&key)
    }

    /// Replace the farm's crop plan. Last write wins.
    pub fn save_crop_plan(&self, plan: &CropPlan) -> Result<()> {
        let key = crop_plan_key(&plan.farm_id);
        self.write(&key, plan)?;
        info!(
            farm = %plan.farm_id,
            crops = plan.crops.len(),
            allocated_ha = plan.allocated_area,
            "crop plan saved"
        );
        Ok(())
    }

    pub fn delete_crop_plan(&self, farm_id: &str) -> Result<()> {
        self.kv.remove(&crop_plan_key(farm_id))
    }

    // --- Resource tasks ---

    pub fn tasks(&self, farm_id: &str) -> Result<Vec<ResourceTask>> {
        Ok(self.read(&tasks_key(farm_id))?.unwrap_or_default())
    }

    pub fn task_ids(&self, farm_id: &str) -> Result<SequentialIds> {
        let tasks = self.tasks(farm_id)?;
        Ok(SequentialIds::after("task", tasks.iter().map(|t| t.id.as_str())))
    }

    /// Append a task to its farm's list. The farm must exist.
    pub fn add_task(&self, task: &ResourceTask) -> Result<()> {
        self.farm_or_err(&task.farm_id)?;
        let mut tasks = self.tasks(&task.farm_id)?;
        tasks.push(task.clone());
        self.write(&tasks_key(&task.farm_id), &tasks)?;
        info!(farm = %task.farm_id, task = %task.id, "task added");
        Ok(())
    }

    /// Flip a task between pending and done and return the updated task.
    pub fn toggle_task(&self, farm_id: &str, task_id: &str, clock: &dyn Clock) -> Result<ResourceTask> {
        let mut tasks = self.tasks(farm_id)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::NotFound(format!("task '{}' not found on farm '{}'", task_id, farm_id)))?;
        task.toggle(clock);
        let updated = task.clone();
        self.write(&tasks_key(farm_id), &tasks)?;
        debug!(farm = %farm_id, task = %task_id, completed = updated.completed, "task toggled");
        Ok(updated)
    }

    // --- Community posts ---

    /// All posts, newest first.
    pub fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.read(POSTS_KEY)?.unwrap_or_default())
    }

    pub fn post_ids(&self) -> Result<SequentialIds> {
        let posts = self.posts()?;
        Ok(SequentialIds::after("post", posts.iter().map(|p| p.id.as_str())))
    }

    /// Put a post at the top of the feed.
    pub fn add_post(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts()?;
        posts.insert(0, post.clone());
        self.write(POSTS_KEY, &posts)?;
        info!(post = %post.id, category = post.category.as_str(), "post published");
        Ok(())
    }

    /// Toggle the local user's like on a post and return the updated post.
    pub fn toggle_like(&self, post_id: &str) -> Result<Post> {
        let mut posts = self.posts()?;
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| Error::NotFound(format!("post '{}' not found", post_id)))?;
        post.toggle_like();
        let updated = post.clone();
        self.write(POSTS_KEY, &posts)?;
        Ok(updated)
    }
}
