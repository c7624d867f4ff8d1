pub mod ai;
pub mod availability;
pub mod blender;
pub mod draft;
pub mod extractor;
pub mod scorer;
pub mod slots;
pub mod triage;
