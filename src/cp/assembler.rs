//! Domain constraints over the encoded assignments.
//!
//! Capacity, exclusivity and timing rules derived from the catalogue. The
//! structural schedule constraints live in [`super::encoder`].

use std::collections::BTreeMap;

use crate::models::{Catalogue, MechanicId, PartnerId, SystemSettings};

use super::encoder::AssignmentVars;
use super::model::{Constraint, CpModel, LinearExpr};

/// Activation and minimum duration of one candidate.
///
/// `is_active + not_is_active = 1`; an active placement runs at least
/// `min_duration` days and an inactive one has size zero.
pub fn add_activation(model: &mut CpModel, vars: &AssignmentVars, settings: &SystemSettings) {
    let complement = LinearExpr::sum([vars.is_active, vars.not_is_active]);
    model.add(Constraint::equals(complement, 1));
    model.add(Constraint::ge(vars.duration, settings.min_duration).only_enforce_if(vars.is_active));
    model.add(Constraint::equals(vars.duration, 0).only_enforce_if(vars.not_is_active));
}

/// `end ≤ partner availability`.
///
/// With 1-based start days and an exclusive end, a partner available for
/// `N` days can host at most `N - 1` promotion days.
pub fn add_horizon_bound(model: &mut CpModel, vars: &AssignmentVars, partner_availability: i64) {
    model.add(Constraint::le(vars.end, partner_availability));
}

/// Per partner, total placement days stay within its availability.
pub fn add_partner_capacity(model: &mut CpModel, catalogue: &Catalogue, assignments: &[AssignmentVars]) {
    let groups = group_by_partner(assignments);
    for partner in &catalogue.partners {
        let Some(members) = groups.get(&partner.id) else {
            continue;
        };
        let days = LinearExpr::sum(members.iter().map(|a| a.duration));
        model.add(Constraint::le(days, partner.availability));
    }
}

/// Per mechanic, total deployment days across partners stay within its
/// availability.
pub fn add_mechanic_capacity(model: &mut CpModel, catalogue: &Catalogue, assignments: &[AssignmentVars]) {
    let groups = group_by_mechanic(assignments);
    for mechanic in &catalogue.mechanics {
        let Some(members) = groups.get(&mechanic.id) else {
            continue;
        };
        let days = LinearExpr::sum(members.iter().map(|a| a.duration));
        model.add(Constraint::le(days, mechanic.availability));
    }
}

/// Per partner, placement intervals are pairwise disjoint.
pub fn add_partner_no_overlap(model: &mut CpModel, assignments: &[AssignmentVars]) {
    for members in group_by_partner(assignments).values() {
        if members.len() > 1 {
            model.add(Constraint::NoOverlap(
                members.iter().map(|a| a.interval).collect(),
            ));
        }
    }
}

/// Adds every domain constraint for the encoded assignments.
pub fn assemble(model: &mut CpModel, catalogue: &Catalogue, assignments: &[AssignmentVars]) {
    for vars in assignments {
        add_activation(model, vars, &catalogue.settings);
        if let Some(partner) = catalogue.partner(&vars.key.partner) {
            add_horizon_bound(model, vars, partner.availability);
        }
    }
    add_partner_capacity(model, catalogue, assignments);
    add_mechanic_capacity(model, catalogue, assignments);
    add_partner_no_overlap(model, assignments);
}

fn group_by_partner(assignments: &[AssignmentVars]) -> BTreeMap<&PartnerId, Vec<&AssignmentVars>> {
    let mut map: BTreeMap<&PartnerId, Vec<&AssignmentVars>> = BTreeMap::new();
    for a in assignments {
        map.entry(&a.key.partner).or_default().push(a);
    }
    map
}

fn group_by_mechanic(assignments: &[AssignmentVars]) -> BTreeMap<&MechanicId, Vec<&AssignmentVars>> {
    let mut map: BTreeMap<&MechanicId, Vec<&AssignmentVars>> = BTreeMap::new();
    for a in assignments {
        map.entry(&a.key.mechanic).or_default().push(a);
    }
    map
}
