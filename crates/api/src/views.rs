// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversion of stored records into response views.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use ifn_domain::{Assignment, AssignmentStatistics, AssignmentTarget, format_timestamp};
use ifn_persistence::{ConglomerateData, Persistence, SampleData, SubplotData, TreeData, UserData};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AssignedBySummary, AssignmentResponse, BrigadistaSummary, ConglomerateInfo,
    ConglomerateSummary, RecordedBySummary, SampleInfo, StatisticsResponse, SubplotInfo,
    SubplotSummary, TreeInfo, UserInfo,
};

pub fn user_info(user: UserData) -> UserInfo {
    UserInfo {
        id: user.user_id,
        name: user.name,
        email: user.email,
        role: user.role,
        zone: user.zone,
        status: user.status,
    }
}

pub fn conglomerate_info(conglomerate: ConglomerateData) -> ConglomerateInfo {
    ConglomerateInfo {
        id: conglomerate.conglomerate_id,
        code: conglomerate.code,
        department: conglomerate.department,
        municipality: conglomerate.municipality,
        vereda: conglomerate.vereda,
        latitude: conglomerate.latitude,
        longitude: conglomerate.longitude,
    }
}

pub fn subplot_info(subplot: SubplotData) -> SubplotInfo {
    SubplotInfo {
        id: subplot.subplot_id,
        conglomerate_code: subplot.conglomerate_code,
        number: subplot.number,
        latitude: subplot.latitude,
        longitude: subplot.longitude,
    }
}

pub fn statistics_response(stats: &AssignmentStatistics) -> StatisticsResponse {
    StatisticsResponse {
        total: stats.total,
        by_status: stats
            .by_status
            .iter()
            .map(|(status, count)| (status.to_string(), *count))
            .collect(),
        by_type: stats
            .by_kind
            .iter()
            .map(|(kind, count)| (kind.to_string(), *count))
            .collect(),
        by_priority: stats
            .by_priority
            .iter()
            .map(|(priority, count)| (priority.to_string(), *count))
            .collect(),
    }
}

/// Resolves user and reference IDs into display summaries.
///
/// Each ID is looked up at most once per resolver.
pub struct ViewResolver<'a> {
    persistence: &'a mut Persistence,
    users: HashMap<i64, UserData>,
    conglomerates: HashMap<i64, ConglomerateSummary>,
    subplots: HashMap<i64, SubplotSummary>,
}

impl<'a> ViewResolver<'a> {
    pub fn new(persistence: &'a mut Persistence) -> Self {
        Self {
            persistence,
            users: HashMap::new(),
            conglomerates: HashMap::new(),
            subplots: HashMap::new(),
        }
    }

    /// Resolves a batch of stored assignments, preserving order.
    pub fn resolve_all(
        &mut self,
        assignments: &[Assignment],
    ) -> Result<Vec<AssignmentResponse>, ApiError> {
        assignments.iter().map(|a| self.resolve(a)).collect()
    }

    /// Resolves one stored assignment.
    pub fn resolve(&mut self, assignment: &Assignment) -> Result<AssignmentResponse, ApiError> {
        let id: i64 = assignment.assignment_id.ok_or_else(|| ApiError::Internal {
            message: String::from("Assignment has no ID after storage"),
        })?;

        let brigadista: &UserData = self.user(assignment.brigadista_id)?;
        let brigadista: BrigadistaSummary = BrigadistaSummary {
            id: brigadista.user_id,
            name: brigadista.name.clone(),
            email: brigadista.email.clone(),
        };
        let assigned_by: &UserData = self.user(assignment.assigned_by)?;
        let assigned_by: AssignedBySummary = AssignedBySummary {
            id: assigned_by.user_id,
            name: assigned_by.name.clone(),
        };

        let (conglomerate, subplot, zone_id) = match &assignment.target {
            AssignmentTarget::Conglomerate(conglomerate_id) => {
                (Some(self.conglomerate(*conglomerate_id)?), None, None)
            }
            AssignmentTarget::Subplot(subplot_id) => (None, Some(self.subplot(*subplot_id)?), None),
            AssignmentTarget::Zone(zone_id) => (None, None, Some(zone_id.clone())),
        };

        Ok(AssignmentResponse {
            id,
            brigadista,
            assignment_type: assignment.kind().to_string(),
            conglomerate,
            subplot,
            zone_id,
            zone_data: None,
            status: assignment.status.to_string(),
            priority: assignment.priority.to_string(),
            assigned_at: format_timestamp("assignedAt", assignment.assigned_at)
                .map_err(translate_domain_error)?,
            started_at: optional_timestamp("startedAt", assignment.started_at)?,
            completed_at: optional_timestamp("completedAt", assignment.completed_at)?,
            due_at: optional_timestamp("dueAt", assignment.due_at)?,
            progress: assignment.progress.value(),
            brigade_label: assignment.brigade_label.clone(),
            notes: assignment.notes.clone(),
            assigned_by,
        })
    }

    /// Resolves a batch of stored trees, preserving order.
    pub fn trees(&mut self, trees: Vec<TreeData>) -> Result<Vec<TreeInfo>, ApiError> {
        trees.into_iter().map(|t| self.tree(t)).collect()
    }

    /// Resolves one stored tree.
    pub fn tree(&mut self, tree: TreeData) -> Result<TreeInfo, ApiError> {
        Ok(TreeInfo {
            subplot: self.subplot(tree.subplot_id)?,
            recorded_by: self.recorded_by(tree.recorded_by)?,
            created_at: format_timestamp("createdAt", tree.created_at)
                .map_err(translate_domain_error)?,
            id: tree.tree_id,
            code: tree.code,
            individual_number: tree.individual_number,
            species: tree.species,
            dbh_cm: tree.dbh_cm,
            height_m: tree.height_m,
            commercial_height_m: tree.commercial_height_m,
            condition: tree.condition,
            sanitary_state: tree.sanitary_state,
            notes: tree.notes,
        })
    }

    /// Resolves a batch of stored samples, preserving order.
    pub fn samples(&mut self, samples: Vec<SampleData>) -> Result<Vec<SampleInfo>, ApiError> {
        samples.into_iter().map(|s| self.sample(s)).collect()
    }

    /// Resolves one stored sample.
    pub fn sample(&mut self, sample: SampleData) -> Result<SampleInfo, ApiError> {
        Ok(SampleInfo {
            recorded_by: self.recorded_by(sample.recorded_by)?,
            collected_at: format_timestamp("collectedAt", sample.collected_at)
                .map_err(translate_domain_error)?,
            created_at: format_timestamp("createdAt", sample.created_at)
                .map_err(translate_domain_error)?,
            id: sample.sample_id,
            code: sample.code,
            tree_code: sample.tree_code,
            tree: sample.tree_id,
            sample_type: sample.kind,
            quantity: sample.quantity,
            condition: sample.condition,
            image_url: sample.image_url,
            notes: sample.notes,
            status: sample.status,
        })
    }

    fn recorded_by(&mut self, user_id: i64) -> Result<RecordedBySummary, ApiError> {
        let user: &UserData = self.user(user_id)?;
        Ok(RecordedBySummary {
            id: user.user_id,
            name: user.name.clone(),
        })
    }

    fn user(&mut self, user_id: i64) -> Result<&UserData, ApiError> {
        match self.users.entry(user_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let user: UserData = self
                    .persistence
                    .get_user_by_id(user_id)
                    .map_err(translate_persistence_error)?
                    .ok_or_else(|| ApiError::Internal {
                        message: format!("Record references missing user {user_id}"),
                    })?;
                Ok(entry.insert(user))
            }
        }
    }

    fn conglomerate(&mut self, conglomerate_id: i64) -> Result<ConglomerateSummary, ApiError> {
        if let Some(summary) = self.conglomerates.get(&conglomerate_id) {
            return Ok(summary.clone());
        }
        let data: ConglomerateData = self
            .persistence
            .get_conglomerate(conglomerate_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| ApiError::Internal {
                message: format!("Assignment references missing conglomerate {conglomerate_id}"),
            })?;
        let summary: ConglomerateSummary = ConglomerateSummary {
            id: data.conglomerate_id,
            code: data.code,
            department: data.department,
            municipality: data.municipality,
            vereda: data.vereda,
            latitude: data.latitude,
            longitude: data.longitude,
        };
        self.conglomerates.insert(conglomerate_id, summary.clone());
        Ok(summary)
    }

    fn subplot(&mut self, subplot_id: i64) -> Result<SubplotSummary, ApiError> {
        if let Some(summary) = self.subplots.get(&subplot_id) {
            return Ok(summary.clone());
        }
        let data: SubplotData = self
            .persistence
            .get_subplot(subplot_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| ApiError::Internal {
                message: format!("Record references missing subplot {subplot_id}"),
            })?;
        let summary: SubplotSummary = SubplotSummary {
            id: data.subplot_id,
            conglomerate_code: data.conglomerate_code,
            number: data.number,
            latitude: data.latitude,
            longitude: data.longitude,
        };
        self.subplots.insert(subplot_id, summary.clone());
        Ok(summary)
    }
}

fn optional_timestamp(
    field: &str,
    value: Option<time::OffsetDateTime>,
) -> Result<Option<String>, ApiError> {
    value
        .map(|timestamp| format_timestamp(field, timestamp))
        .transpose()
        .map_err(translate_domain_error)
}
