//! Mocked collaborators, used by the coordinator tests and the runner tests.

pub mod mock_stack;
