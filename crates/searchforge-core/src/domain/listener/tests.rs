use super::*;
use crate::domain::ChainLink;
use crate::error::SearchForgeError;

#[derive(Clone, Debug, PartialEq)]
struct Chain {
    previous: Vec<Option<ChainLink>>,
    next: Vec<Option<usize>>,
    anchor: Vec<Option<usize>>,
}

fn count(s: &Chain) -> usize {
    s.previous.len()
}

fn previous(s: &Chain, i: usize) -> Option<ChainLink> {
    s.previous[i]
}

fn next(s: &Chain, i: usize) -> Option<usize> {
    s.next[i]
}

fn set_next(s: &mut Chain, i: usize, v: Option<usize>) {
    s.next[i] = v;
}

fn anchor(s: &Chain, i: usize) -> Option<usize> {
    s.anchor[i]
}

fn set_anchor(s: &mut Chain, i: usize, v: Option<usize>) {
    s.anchor[i] = v;
}

struct RecordingContext {
    solution: Chain,
    events: Vec<String>,
    open: Option<(EntityReference, &'static str)>,
}

impl ShadowContext<Chain> for RecordingContext {
    fn working_solution(&self) -> &Chain {
        &self.solution
    }

    fn working_solution_mut(&mut self) -> &mut Chain {
        &mut self.solution
    }

    fn before_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()> {
        if self.open.is_some() {
            return Err(SearchForgeError::Internal("nested write".to_string()));
        }
        self.open = Some((entity, variable_name));
        self.events.push(format!("before {} {}", variable_name, entity.entity_index));
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()> {
        if self.open.take() != Some((entity, variable_name)) {
            return Err(SearchForgeError::Internal("unbalanced write".to_string()));
        }
        self.events.push(format!("after {} {}", variable_name, entity.entity_index));
        Ok(())
    }
}

// anchor 0 <- e0 <- e1, anchor 1 <- e2
fn two_chains() -> Chain {
    Chain {
        previous: vec![
            Some(ChainLink::Anchor(0)),
            Some(ChainLink::Entity(0)),
            Some(ChainLink::Anchor(1)),
        ],
        next: vec![Some(1), None, None],
        anchor: vec![Some(0), Some(0), Some(1)],
    }
}

fn inverse() -> InverseRelationListener<Chain> {
    InverseRelationListener::new(0, "next", count, previous, next, set_next)
}

fn anchors() -> AnchorListener<Chain> {
    AnchorListener::new(0, "anchor", count, previous, anchor, set_anchor)
}

#[test]
fn test_inverse_relation_follows_moved_link() {
    let mut listener = inverse();
    let mut ctx = RecordingContext {
        solution: two_chains(),
        events: Vec::new(),
        open: None,
    };
    let e1 = EntityReference::new(0, 1);

    // Move e1 to the end of the second chain.
    listener.before_variable_changed(&mut ctx, e1).unwrap();
    ctx.solution.previous[1] = Some(ChainLink::Entity(2));
    listener.after_variable_changed(&mut ctx, e1).unwrap();

    assert_eq!(ctx.solution.next, vec![None, None, Some(1)]);
    assert_eq!(
        ctx.events,
        vec!["before next 0", "after next 0", "before next 2", "after next 2"]
    );
}

#[test]
fn test_anchor_propagates_down_the_chain() {
    let mut listener = anchors();
    let mut ctx = RecordingContext {
        solution: two_chains(),
        events: Vec::new(),
        open: None,
    };

    // Re-root e0 (and therefore e1) on anchor 1 behind e2.
    ctx.solution.previous[0] = Some(ChainLink::Entity(2));
    listener
        .after_variable_changed(&mut ctx, EntityReference::new(0, 0))
        .unwrap();

    assert_eq!(ctx.solution.anchor, vec![Some(1), Some(1), Some(1)]);
    assert_eq!(ctx.events.len(), 4);
}

#[test]
fn test_anchor_detects_cycle() {
    let mut listener = anchors();
    let mut solution = two_chains();
    solution.previous[0] = Some(ChainLink::Entity(1));
    let mut ctx = RecordingContext {
        solution,
        events: Vec::new(),
        open: None,
    };

    let result = listener.after_variable_changed(&mut ctx, EntityReference::new(0, 0));
    assert!(matches!(result, Err(SearchForgeError::DomainModel(_))));
}

#[test]
fn test_reset_and_find_stale() {
    let mut listener = inverse();
    let mut stale = two_chains();
    stale.next[0] = None;

    let mut expected = stale.clone();
    listener.reset_working_solution(&mut expected);
    assert_eq!(expected.next, vec![Some(1), None, None]);

    let report = listener.find_stale(&stale, &expected).unwrap();
    assert!(report.contains("next"));
    assert!(listener.find_stale(&expected, &expected).is_none());

    let mut anchors = anchors();
    let mut reset = stale.clone();
    reset.anchor = vec![None; 3];
    anchors.reset_working_solution(&mut reset);
    assert_eq!(reset.anchor, vec![Some(0), Some(0), Some(1)]);
}
