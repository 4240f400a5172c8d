//! Compile orchestration: issuing requests and applying their results.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use solsense_error::{CompilationError, ErrorMarker};
use solsense_sema::{CompilationDiagnostics, CompilationResult, SymbolIndex};

use crate::code_parser::CodeParser;
use crate::collaborators::{CompilationFinished, CompileRequest, ImportCallback};
use crate::error::CodeParserError;
use crate::file_state::FileState;
use crate::state::{AnalysisDatabase, CodeParserEvent, CompileState, Task};

impl CodeParser {
    /// Compile the active file with the current compiler settings. The
    /// result is queued as a task once the compiler calls back.
    pub fn compile(&self) {
        match self.request_compilation() {
            Ok(()) => {}
            Err(CodeParserError::NoCurrentFile) => log::debug!("nothing to compile"),
            Err(err) => log::error!("compilation request failed: {}", err),
        }
    }

    fn request_compilation(&self) -> Result<(), CodeParserError> {
        let compiler = &self.collaborators.compiler;
        let config = self
            .collaborators
            .config
            .compiler_config()
            .unwrap_or_else(|err| {
                log::warn!("using default compiler settings: {:#}", err);
                Default::default()
            });
        for (name, value) in config.options() {
            if let Err(err) = compiler.set_option(name, value) {
                log::warn!("failed to set compiler option {}: {:#}", name, err);
            }
        }

        let file = self
            .collaborators
            .files
            .current_file()?
            .ok_or(CodeParserError::NoCurrentFile)?;
        let content = self.collaborators.files.read_file(&file)?;

        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.current_file = Some(file.clone());
            state.compile_state = CompileState::Compiling {
                generation: state.generation,
            };
            state.generation
        };
        log::info!("compiling {} (generation {})", file, generation);

        let mut sources = IndexMap::new();
        sources.insert(file.clone(), content);
        let request = CompileRequest {
            target: file,
            sources,
            import_callback: self.import_callback(),
        };
        let sender = self.task_sender.clone();
        compiler.compile(
            request,
            Box::new(move |finished| {
                if sender
                    .send(Task::CompilationFinished {
                        generation,
                        finished,
                    })
                    .is_err()
                {
                    log::warn!("compilation {} finished after shutdown", generation);
                }
            }),
        )?;
        Ok(())
    }

    fn import_callback(&self) -> ImportCallback {
        let imports = self.collaborators.imports.clone();
        Arc::new(move |url: &str| {
            imports.resolve_and_save(url).map_err(|err| {
                log::warn!("failed to resolve import {}: {:#}", url, err);
                format!("{:#}", err)
            })
        })
    }

    /// Apply every queued task without blocking. Returns how many were
    /// applied.
    pub fn process_tasks(&self) -> usize {
        let mut applied = 0;
        while let Ok(task) = self.task_receiver.try_recv() {
            self.handle_task(task);
            applied += 1;
        }
        applied
    }

    /// Block until a compilation finishes or `timeout` elapses, then apply
    /// all queued tasks. Returns false on timeout.
    pub fn wait_for_compilation(&self, timeout: Duration) -> bool {
        match self.task_receiver.recv_timeout(timeout) {
            Ok(task) => {
                self.handle_task(task);
                self.process_tasks();
                true
            }
            Err(_) => false,
        }
    }

    fn handle_task(&self, task: Task) {
        match task {
            Task::CompilationFinished {
                generation,
                finished,
            } => {
                let latest = self.state.read().generation;
                if generation < latest {
                    log::debug!(
                        "dropping compilation {}, generation {} was requested since",
                        generation,
                        latest
                    );
                    return;
                }
                self.on_compilation_finished(generation, finished);
            }
        }
    }

    fn on_compilation_finished(&self, generation: u64, finished: CompilationFinished) {
        if let Err(err) = self.collaborators.editor.clear_annotations() {
            log::warn!("failed to clear annotations: {:#}", err);
        }
        log::info!(
            "compilation {} finished with {} (success: {})",
            generation,
            if finished.version.is_empty() {
                "unknown compiler"
            } else {
                finished.version.as_str()
            },
            finished.success
        );

        // Diagnostics first, the sources may still fail to decode.
        let diagnostics = match CompilationDiagnostics::from_json(&finished.data) {
            Ok(diagnostics) => diagnostics,
            Err(err) => {
                log::error!("{}", CodeParserError::from(err));
                self.fail(generation);
                return;
            }
        };
        let fatal = diagnostics.has_fatal_error();
        self.report_diagnostics(&diagnostics, &finished, fatal);
        if fatal {
            self.fail(generation);
            return;
        }

        let result = match CompilationResult::from_json(finished.data.clone()) {
            Ok(result) => result,
            Err(err) => {
                log::error!("{}", CodeParserError::from(err));
                self.fail(generation);
                return;
            }
        };
        if result.sources.is_empty() {
            log::info!("compilation {} produced no sources", generation);
            self.state.write().compile_state = CompileState::Idle;
            return;
        }

        let index = SymbolIndex::build(&result, generation);
        let db = Arc::new(AnalysisDatabase {
            result,
            index,
            sources: finished.sources,
            version: finished.version,
        });
        {
            let mut state = self.state.write();
            state.db = Some(db);
            state.error_state = false;
            state.compile_state = CompileState::Succeeded;
        }
        self.emit(CodeParserEvent::AstFinished { generation });
    }

    fn fail(&self, generation: u64) {
        {
            let mut state = self.state.write();
            state.error_state = true;
            state.compile_state = CompileState::FailedFatal;
        }
        self.emit(CodeParserEvent::CompilationFailed { generation });
    }

    fn report_diagnostics(
        &self,
        diagnostics: &CompilationDiagnostics,
        finished: &CompilationFinished,
        fatal: bool,
    ) {
        let current_file = self.current_file();
        if !diagnostics.errors.is_empty() {
            let markers: Vec<ErrorMarker> = diagnostics
                .errors
                .iter()
                .map(|error| self.error_marker(error, finished))
                .collect();
            if let Err(err) = self.collaborators.editor.add_error_markers(&markers) {
                log::warn!("failed to add error markers: {:#}", err);
            }
            if let Some(file) = &current_file {
                self.set_file_state(FileState::diagnosed(file, fatal));
            }
        } else {
            if let Some(file) = &current_file {
                self.set_file_state(FileState::cleared(file));
            }
            let names: Vec<String> = finished.sources.keys().cloned().collect();
            if let Err(err) = self.collaborators.editor.clear_error_markers(&names) {
                log::warn!("failed to clear error markers: {:#}", err);
            }
        }
    }

    fn error_marker(&self, error: &CompilationError, finished: &CompilationFinished) -> ErrorMarker {
        let position = error.position();
        let line_column = error
            .source_location
            .as_ref()
            .filter(|location| location.start >= 0)
            .and_then(|location| {
                let file = if position.file.is_empty() {
                    location.file.as_str()
                } else {
                    position.file.as_str()
                };
                let file_index = finished.sources.get_index_of(file).unwrap_or(0);
                let range = location.to_source_location(Some(file_index));
                self.collaborators
                    .converter
                    .offset_to_line_column(&range, file_index, &finished.sources, None)
                    .map_err(|err| log::debug!("no line/column for diagnostic: {:#}", err))
                    .ok()
            });
        ErrorMarker {
            error: error.clone(),
            line_column,
        }
    }

    fn set_file_state(&self, state: FileState) {
        if let Err(err) = self.collaborators.file_states.set_file_states(&[state]) {
            log::warn!("failed to set file state: {:#}", err);
        }
    }
}
