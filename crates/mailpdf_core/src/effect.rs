use crate::validation::ProcessingConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the host for an output directory; answered with `Msg::OutputDirectoryPicked`.
    PickOutputDirectory,
    StartProcessing(ProcessingConfig),
    /// Best effort; already written documents stay on disk.
    CancelProcessing,
}
