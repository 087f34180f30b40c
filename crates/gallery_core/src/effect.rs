use crate::DomainUpdate;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver an update to the subscribers of its key.
    Publish(DomainUpdate),
    /// The status tracker changed; busy indicators should re-render.
    StatusChanged,
}
