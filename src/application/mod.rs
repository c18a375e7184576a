pub mod calendar;
pub mod filters;
pub mod focus;
pub mod folders;
pub mod habits;
pub mod lookup;
pub mod params;
pub mod projects;
pub mod resources;
pub mod tags;
pub mod tasks;

#[cfg(test)]
pub(crate) mod test_support;
