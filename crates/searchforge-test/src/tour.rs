//! A chained tour with shadow variables.
//!
//! Visits are chained behind vehicles: `Vehicle <- Visit <- Visit`. The
//! genuine `previous` variable points at a vehicle (anchor) or at another
//! visit. Three shadow variables are derived from it:
//!
//! - `next`: inverse of `previous`
//! - `vehicle`: anchor of the chain
//! - `arrival`: departure of the previous stop plus travel distance
//!
//! Locations lie on a line, so travel distance is `|a - b|`.

use searchforge_core::domain::{
    AnchorListener, ChainLink, EntityDescriptor, EntityReference, InverseRelationListener,
    PlanningSolution, ShadowContext, SolutionDescriptor, VariableDescriptor, VariableListener,
};
use searchforge_core::score::SimpleScore;
use searchforge_core::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub depot: i64,
    pub ready_time: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub location: i64,
    pub service_duration: i64,
    pub previous: Option<ChainLink>,
    pub next: Option<usize>,
    pub vehicle: Option<usize>,
    pub arrival: Option<i64>,
}

impl Visit {
    pub fn new(location: i64, service_duration: i64) -> Self {
        Self {
            location,
            service_duration,
            previous: None,
            next: None,
            vehicle: None,
            arrival: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourSolution {
    pub vehicles: Vec<Vehicle>,
    pub visits: Vec<Visit>,
    pub score: Option<SimpleScore>,
}

impl TourSolution {
    /// Builds a tour from chains of visit indices, one chain per vehicle.
    ///
    /// Shadow variables are left empty; a score director computes them.
    pub fn with_chains(vehicles: Vec<Vehicle>, mut visits: Vec<Visit>, chains: &[Vec<usize>]) -> Self {
        for (vehicle, chain) in chains.iter().enumerate() {
            let mut link = ChainLink::Anchor(vehicle);
            for &visit in chain {
                visits[visit].previous = Some(link);
                link = ChainLink::Entity(visit);
            }
        }
        Self {
            vehicles,
            visits,
            score: None,
        }
    }

    /// Two vehicles and four visits: vehicle 0 serves `0 -> 1`, vehicle 1 serves `2`,
    /// visit 3 is unassigned.
    pub fn small() -> Self {
        Self::with_chains(
            vec![
                Vehicle {
                    depot: 0,
                    ready_time: 0,
                },
                Vehicle {
                    depot: 10,
                    ready_time: 5,
                },
            ],
            vec![
                Visit::new(2, 1),
                Visit::new(4, 1),
                Visit::new(12, 2),
                Visit::new(7, 1),
            ],
            &[vec![0, 1], vec![2]],
        )
    }
}

impl PlanningSolution for TourSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }

    fn is_initialized(&self) -> bool {
        self.visits.iter().all(|v| v.previous.is_some())
    }
}

pub fn visit_count(s: &TourSolution) -> usize {
    s.visits.len()
}

pub fn get_previous(s: &TourSolution, idx: usize) -> Option<ChainLink> {
    s.visits[idx].previous
}

pub fn set_previous(s: &mut TourSolution, idx: usize, v: Option<ChainLink>) {
    s.visits[idx].previous = v;
}

pub fn get_next(s: &TourSolution, idx: usize) -> Option<usize> {
    s.visits[idx].next
}

pub fn set_next(s: &mut TourSolution, idx: usize, v: Option<usize>) {
    s.visits[idx].next = v;
}

pub fn get_vehicle(s: &TourSolution, idx: usize) -> Option<usize> {
    s.visits[idx].vehicle
}

pub fn set_vehicle(s: &mut TourSolution, idx: usize, v: Option<usize>) {
    s.visits[idx].vehicle = v;
}

/// Sum of arrival times as a penalty; unassigned visits cost nothing.
pub fn calculate_score(solution: &TourSolution) -> SimpleScore {
    let total: i64 = (0..solution.visits.len())
        .filter_map(|i| compute_arrival(solution, i))
        .sum();
    SimpleScore::of(-total)
}

/// Computes the arrival at a visit from the `previous` chain alone.
///
/// Returns `None` for unassigned visits and for broken chains.
pub fn compute_arrival(solution: &TourSolution, idx: usize) -> Option<i64> {
    let mut path = vec![idx];
    let mut current = idx;
    let anchor = loop {
        match solution.visits[current].previous? {
            ChainLink::Anchor(vehicle) => break vehicle,
            ChainLink::Entity(previous) => {
                if path.len() > solution.visits.len() {
                    return None;
                }
                path.push(previous);
                current = previous;
            }
        }
    };
    let vehicle = &solution.vehicles[anchor];
    let mut location = vehicle.depot;
    let mut departure = vehicle.ready_time;
    let mut arrival = departure;
    for &stop in path.iter().rev() {
        let visit = &solution.visits[stop];
        arrival = departure + (visit.location - location).abs();
        departure = arrival + visit.service_duration;
        location = visit.location;
    }
    Some(arrival)
}

/// Maintains `arrival` along a chain after a `previous` or `vehicle` change.
///
/// Starting at the changed visit, arrivals are rewritten down the chain
/// through `next` until one is already correct.
#[derive(Debug, Default)]
pub struct ArrivalListener;

impl ArrivalListener {
    fn expected(solution: &TourSolution, idx: usize) -> Option<i64> {
        let visit = &solution.visits[idx];
        match visit.previous? {
            ChainLink::Anchor(vehicle) => {
                let vehicle = &solution.vehicles[vehicle];
                Some(vehicle.ready_time + (visit.location - vehicle.depot).abs())
            }
            ChainLink::Entity(previous) => {
                let previous = &solution.visits[previous];
                let departure = previous.arrival? + previous.service_duration;
                Some(departure + (visit.location - previous.location).abs())
            }
        }
    }
}

impl VariableListener<TourSolution> for ArrivalListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<TourSolution>,
        entity: EntityReference,
    ) -> Result<()> {
        let mut current = Some(entity.entity_index);
        let mut remaining = ctx.working_solution().visits.len();
        while let Some(idx) = current {
            let arrival = Self::expected(ctx.working_solution(), idx);
            if ctx.working_solution().visits[idx].arrival == arrival || remaining == 0 {
                break;
            }
            let reference = EntityReference::new(entity.descriptor_index, idx);
            ctx.before_variable_changed(reference, "arrival")?;
            ctx.working_solution_mut().visits[idx].arrival = arrival;
            ctx.after_variable_changed(reference, "arrival")?;
            current = ctx.working_solution().visits[idx].next;
            remaining -= 1;
        }
        Ok(())
    }

    fn reset_working_solution(&mut self, solution: &mut TourSolution) {
        for i in 0..solution.visits.len() {
            solution.visits[i].arrival = compute_arrival(solution, i);
        }
    }

    fn find_stale(&self, working: &TourSolution, expected: &TourSolution) -> Option<String> {
        (0..expected.visits.len()).find_map(|i| {
            let actual = working.visits[i].arrival;
            let wanted = expected.visits[i].arrival;
            (actual != wanted)
                .then(|| format!("arrival of visit {} is {:?} but should be {:?}", i, actual, wanted))
        })
    }
}

pub fn inverse_listener() -> InverseRelationListener<TourSolution> {
    InverseRelationListener::new(0, "next", visit_count, get_previous, get_next, set_next)
}

pub fn anchor_listener() -> AnchorListener<TourSolution> {
    AnchorListener::new(0, "vehicle", visit_count, get_previous, get_vehicle, set_vehicle)
}

/// The tour descriptor; `arrival` reads `previous` and `vehicle`.
pub fn create_tour_descriptor() -> SolutionDescriptor<TourSolution> {
    SolutionDescriptor::new("TourSolution").with_entity(
        EntityDescriptor::new("Visit", visit_count)
            .with_variable(VariableDescriptor::chained("previous").with_allows_unassigned(true))
            .with_variable(VariableDescriptor::inverse_relation("next", "Visit", "previous"))
            .with_variable(VariableDescriptor::anchor("vehicle", "Visit", "previous"))
            .with_variable(
                VariableDescriptor::shadow("arrival")
                    .with_source("Visit", "previous")
                    .with_source("Visit", "vehicle"),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_arrival() {
        let tour = TourSolution::small();
        // depot 0 -> 2 (arrive 2, leave 3) -> 4 (arrive 5)
        assert_eq!(compute_arrival(&tour, 0), Some(2));
        assert_eq!(compute_arrival(&tour, 1), Some(5));
        // ready 5, depot 10 -> 12
        assert_eq!(compute_arrival(&tour, 2), Some(7));
        assert_eq!(compute_arrival(&tour, 3), None);
        assert_eq!(calculate_score(&tour), SimpleScore::of(-14));
    }

    #[test]
    fn test_reset_fills_shadows() {
        let mut tour = TourSolution::small();
        inverse_listener().reset_working_solution(&mut tour);
        anchor_listener().reset_working_solution(&mut tour);
        ArrivalListener.reset_working_solution(&mut tour);
        assert_eq!(tour.visits[0].next, Some(1));
        assert_eq!(tour.visits[1].vehicle, Some(0));
        assert_eq!(tour.visits[2].vehicle, Some(1));
        assert_eq!(tour.visits[3].vehicle, None);
        assert_eq!(tour.visits[1].arrival, Some(5));
    }

    #[test]
    fn test_descriptor_order() {
        let order = create_tour_descriptor().validate().unwrap();
        let names: Vec<&str> = order.iter().map(|d| d.target.variable_name).collect();
        assert_eq!(names, vec!["next", "vehicle", "arrival"]);
    }
}
