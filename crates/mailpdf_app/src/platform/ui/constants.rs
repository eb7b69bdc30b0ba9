pub const PROMPT: &str = "> ";
pub const DIRECTORY_PROMPT: &str = "dir> ";
pub const PROGRESS_BAR_WIDTH: usize = 30;

pub const HELP: &[&str] = &[
    "file <path>        select a PST file",
    "drop <path>...     drop one or more files",
    "clear              remove the selected file",
    "count <n>          messages per PDF (empty for default)",
    "name <base>        base name of the PDF files",
    "dir <path>         output directory",
    "browse             choose the output directory interactively",
    "start              start processing",
    "cancel / confirm / keep",
    "dismiss            dismiss the current error",
    "recover <n>        run recovery action n",
    "reset              start over",
    "retry / reload / report   after an unexpected failure",
    "help / quit",
];
