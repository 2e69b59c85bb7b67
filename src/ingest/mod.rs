/// External data source clients.
///
/// Each provider gets its own file: `iwls` for the authoritative
/// hydrographic station network, `marine_model` for the open-ocean model
/// fallback. `fixtures` holds representative response payloads for tests.

pub mod iwls;
pub mod marine_model;

#[cfg(test)]
pub mod fixtures;
