//! Double-buffered edge state

use std::marker::PhantomData;

use super::error::InputError;
use super::identity::InputId;

/// State of a key or button across two consecutive steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Up this step and the previous step.
    Up,
    /// Went down this step (edge).
    Pressed,
    /// Down this step and the previous step.
    Down,
    /// Went up this step (edge).
    Released,
}

impl InputState {
    fn classify(current: bool, previous: bool) -> Self {
        match (current, previous) {
            (false, false) => Self::Up,
            (true, false) => Self::Pressed,
            (true, true) => Self::Down,
            (false, true) => Self::Released,
        }
    }

    /// Returns true if currently down (pressed this step or held).
    pub fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Down)
    }

    /// Returns true if currently up.
    pub fn is_up(self) -> bool {
        !self.is_down()
    }

    /// Returns true if the down edge happened this step.
    pub fn is_just_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }

    /// Returns true if the up edge happened this step.
    pub fn is_just_released(self) -> bool {
        matches!(self, Self::Released)
    }
}

/// Double-buffered boolean register over a bounded identity space.
///
/// `current` is folded continuously as raw transitions arrive; `previous`
/// holds the value `current` had when the prior step committed. Edge
/// queries (`Pressed`, `Released`) derive from the pair, so they stay valid
/// for the whole step in which the transition's dispatch fires.
#[derive(Debug, Clone)]
pub struct EdgeState<I: InputId> {
    current: Vec<bool>,
    previous: Vec<bool>,
    _marker: PhantomData<I>,
}

impl<I: InputId> EdgeState<I> {
    pub fn new() -> Self {
        Self {
            current: vec![false; I::COUNT],
            previous: vec![false; I::COUNT],
            _marker: PhantomData,
        }
    }

    /// Folds a raw transition into the current buffer. Side effect only;
    /// never triggers callbacks. The `Any` sentinel is ignored.
    pub fn set(&mut self, id: I, down: bool) {
        if let Some(index) = id.index() {
            self.current[index] = down;
        }
    }

    /// Copies the current buffer into the previous buffer.
    ///
    /// Must run exactly once per step, after that step's dispatch.
    pub fn commit(&mut self) {
        self.previous.copy_from_slice(&self.current);
    }

    /// Queries the state of one concrete identity.
    pub fn state(&self, id: I) -> Result<InputState, InputError> {
        let index = id.index().ok_or(InputError::InvalidIdentity)?;
        Ok(InputState::classify(self.current[index], self.previous[index]))
    }

    /// Returns true if the identity is currently down.
    pub fn is_down(&self, id: I) -> Result<bool, InputError> {
        let index = id.index().ok_or(InputError::InvalidIdentity)?;
        Ok(self.current[index])
    }

    /// Returns true if the identity is currently up.
    pub fn is_up(&self, id: I) -> Result<bool, InputError> {
        self.is_down(id).map(|down| !down)
    }

    /// Aggregate query over all concrete identities, OR per buffer.
    pub fn any_state(&self) -> InputState {
        let current = self.current.iter().any(|&down| down);
        let previous = self.previous.iter().any(|&down| down);
        InputState::classify(current, previous)
    }

    /// Returns true if any concrete identity is currently down.
    pub fn any_down(&self) -> bool {
        self.current.iter().any(|&down| down)
    }
}

impl<I: InputId> Default for EdgeState<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::identity::Button;

    #[test]
    fn test_full_transition_cycle() {
        let mut edge = EdgeState::<Button>::new();
        assert_eq!(edge.state(Button::Left), Ok(InputState::Up));

        edge.set(Button::Left, true);
        assert_eq!(edge.state(Button::Left), Ok(InputState::Pressed));

        edge.commit();
        assert_eq!(edge.state(Button::Left), Ok(InputState::Down));

        edge.set(Button::Left, false);
        assert_eq!(edge.state(Button::Left), Ok(InputState::Released));

        edge.commit();
        assert_eq!(edge.state(Button::Left), Ok(InputState::Up));
    }

    #[test]
    fn test_edge_holds_until_commit() {
        let mut edge = EdgeState::<Button>::new();
        edge.set(Button::Right, true);

        // Pressed stays observable for the whole step.
        assert!(edge.state(Button::Right).unwrap().is_just_pressed());
        assert!(edge.state(Button::Right).unwrap().is_just_pressed());

        edge.commit();
        assert!(!edge.state(Button::Right).unwrap().is_just_pressed());
        assert!(edge.state(Button::Right).unwrap().is_down());
    }

    #[test]
    fn test_any_sentinel_rejected_as_concrete() {
        let edge = EdgeState::<Button>::new();
        assert_eq!(edge.state(Button::Any), Err(InputError::InvalidIdentity));
        assert_eq!(edge.is_down(Button::Any), Err(InputError::InvalidIdentity));
        assert_eq!(edge.is_up(Button::Any), Err(InputError::InvalidIdentity));
    }

    #[test]
    fn test_any_aggregates_with_or() {
        let mut edge = EdgeState::<Button>::new();
        assert_eq!(edge.any_state(), InputState::Up);
        assert!(!edge.any_down());

        edge.set(Button::Middle, true);
        assert_eq!(edge.any_state(), InputState::Pressed);
        assert!(edge.any_down());

        edge.commit();
        edge.set(Button::Left, true);
        edge.set(Button::Middle, false);
        // One button released, another pressed: still down both steps.
        assert_eq!(edge.any_state(), InputState::Down);

        edge.commit();
        edge.set(Button::Left, false);
        assert_eq!(edge.any_state(), InputState::Released);
    }

    #[test]
    fn test_set_ignores_sentinel() {
        let mut edge = EdgeState::<Button>::new();
        edge.set(Button::Any, true);
        assert!(!edge.any_down());
    }
}
