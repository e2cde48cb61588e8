use colored::*;

/// Turns raw linker output into a short hint about the likely fix
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Main function missing (library built as executable)
        if output.contains("undefined reference to `main'")
            || output.contains("undefined symbol: main")
            || output.contains("entry point must be defined")
        {
            return Some(format!(
                "Your project is missing a {} function.\nIf this is a library, add {} or {} to the project file.",
                "main()".bold().yellow(),
                "static".bold().green(),
                "dynamic".bold().green()
            ));
        }

        // 2. lld not installed
        if output.contains("-fuse-ld=lld") || output.contains("invalid linker name") {
            return Some(format!(
                "The {} linker could not be found.\nInstall lld, or pick another compiler with {}.",
                "lld".bold().red(),
                "compiler <program>".bold().yellow()
            ));
        }

        // 3. Generic missing symbol
        if output.contains("undefined reference to")
            || output.contains("undefined symbol")
            || output.contains("LNK2019")
        {
            return Some(format!(
                "It looks like a {} error.\nYou might be missing a {} or a {} line.",
                "Linker".bold().red(),
                "require".bold().yellow(),
                "linker_arg".bold().yellow()
            ));
        }

        // 4. Objects that never got built
        if output.contains("no such file or directory") && output.contains(".o") {
            return Some(format!(
                "Some objects are missing, most likely because a {} failed above.",
                "compile step".bold().red()
            ));
        }

        None
    }
}
