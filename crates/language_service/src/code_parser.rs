use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use solsense_ast::{AstNode, AstNodeRef, NodeId};
use solsense_parser::ParserOptions;
use solsense_span::SourceLocation;

use crate::collaborators::{
    CompilerConfigProvider, CompilerService, EditorSurface, FileProvider, FileStateStore,
    ImportResolver, LineColumnConverter, RopeLineColumnConverter,
};
use crate::error::CodeParserError;
use crate::state::{AnalysisDatabase, AnalysisState, CodeParserEvent, CompileState, Task};
use crate::{find_refs, goto_def, hover};

/// The host services a [`CodeParser`] talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub compiler: Arc<dyn CompilerService>,
    pub files: Arc<dyn FileProvider>,
    pub imports: Arc<dyn ImportResolver>,
    pub converter: Arc<dyn LineColumnConverter>,
    pub editor: Arc<dyn EditorSurface>,
    pub file_states: Arc<dyn FileStateStore>,
    pub config: Arc<dyn CompilerConfigProvider>,
}

impl Collaborators {
    /// Collaborators using the rope based line/column converter.
    pub fn new(
        compiler: Arc<dyn CompilerService>,
        files: Arc<dyn FileProvider>,
        imports: Arc<dyn ImportResolver>,
        editor: Arc<dyn EditorSurface>,
        file_states: Arc<dyn FileStateStore>,
        config: Arc<dyn CompilerConfigProvider>,
    ) -> Self {
        Self {
            compiler,
            files,
            imports,
            converter: Arc::new(RopeLineColumnConverter),
            editor,
            file_states,
            config,
        }
    }
}

/// Analysis engine of the active Solidity file.
///
/// The engine owns all analysis state. Compiler callbacks only enqueue
/// tasks, the owner applies them with [`CodeParser::process_tasks`] or
/// [`CodeParser::wait_for_compilation`].
pub struct CodeParser {
    pub(crate) collaborators: Collaborators,
    pub(crate) parser_options: ParserOptions,
    pub(crate) state: RwLock<AnalysisState>,
    pub(crate) task_sender: Sender<Task>,
    pub(crate) task_receiver: Receiver<Task>,
    subscribers: Mutex<Vec<Sender<CodeParserEvent>>>,
}

impl CodeParser {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_parser_options(collaborators, ParserOptions::default())
    }

    pub fn with_parser_options(collaborators: Collaborators, parser_options: ParserOptions) -> Self {
        let (task_sender, task_receiver) = unbounded::<Task>();
        CodeParser {
            collaborators,
            parser_options,
            state: RwLock::new(AnalysisState::default()),
            task_sender,
            task_receiver,
            subscribers: Mutex::new(vec![]),
        }
    }

    /// Receive a [`CodeParserEvent`] for every applied compilation.
    pub fn subscribe(&self) -> Receiver<CodeParserEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub(crate) fn emit(&self, event: CodeParserEvent) {
        log::debug!("emit {:?}", event);
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    /// The active file was edited.
    pub fn on_content_changed(&self) {
        self.get_current_file_ast(None);
        self.compile();
    }

    /// Another file became active.
    pub fn on_current_file_changed(&self) {
        self.get_current_file_ast(None);
        self.compile();
    }

    /// A compiler version is being loaded from `url`.
    pub fn on_loading_compiler(&self, url: &str) {
        log::info!("loading compiler from {}", url);
        if let Err(err) = self.collaborators.compiler.load_version(true, url) {
            log::error!("failed to load compiler {}: {:#}", url, err);
        }
    }

    pub fn error_state(&self) -> bool {
        self.state.read().error_state
    }

    pub fn compile_state(&self) -> CompileState {
        self.state.read().compile_state
    }

    pub fn current_file(&self) -> Option<String> {
        self.state.read().current_file.clone()
    }

    /// The database of the last applied compilation.
    pub fn get_last_compilation_result(&self) -> Option<Arc<AnalysisDatabase>> {
        self.state.read().db.clone()
    }

    pub(crate) fn db(&self) -> Result<Arc<AnalysisDatabase>, CodeParserError> {
        self.get_last_compilation_result()
            .ok_or(CodeParserError::NoCompilationResult)
    }

    pub fn get_node_by_id(&self, id: NodeId) -> Option<AstNodeRef> {
        self.db().ok()?.index.node_by_id(id).cloned()
    }

    /// Nodes referencing the declaration `id`.
    pub fn get_declaration(&self, id: NodeId) -> Vec<AstNodeRef> {
        self.db()
            .ok()
            .and_then(|db| db.index.declaration(id).map(<[AstNodeRef]>::to_vec))
            .unwrap_or_default()
    }

    pub fn get_nodes_with_scope(&self, scope: NodeId) -> Vec<AstNodeRef> {
        self.db()
            .map(|db| db.index.nodes_with_scope(scope))
            .unwrap_or_default()
    }

    pub fn get_nodes_with_name(&self, name: &str) -> Vec<AstNodeRef> {
        self.db()
            .map(|db| db.index.nodes_with_name(name))
            .unwrap_or_default()
    }

    /// Every indexed node, in index order.
    pub fn get_nodes(&self) -> Vec<AstNodeRef> {
        self.db()
            .map(|db| db.index.nodes().values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn declaration_of(&self, node: &AstNode) -> Option<AstNodeRef> {
        goto_def::declaration_of(&self.db().ok()?.index, node)
    }

    pub fn references_of(&self, node: &AstNode) -> Vec<AstNodeRef> {
        self.db()
            .map(|db| find_refs::references_of(&db.index, node))
            .unwrap_or_default()
    }

    /// References of the innermost node at `offset`.
    pub fn referrences_at_position(&self, offset: usize) -> Vec<AstNodeRef> {
        match self.nodes_at_position(offset, None).last() {
            Some(node) => self.references_of(node),
            None => vec![],
        }
    }

    /// "`<file> <line>:<column>`" of where `node` starts, lines 0-based.
    pub fn get_node_link(&self, node: &AstNode) -> Option<String> {
        match self.node_link(node) {
            Ok(link) => Some(link),
            Err(err) => {
                log::warn!("no link for node {}: {}", node.id, err);
                None
            }
        }
    }

    fn node_link(&self, node: &AstNode) -> Result<String, CodeParserError> {
        let db = self.db()?;
        let position = goto_def::position_of_definition(node);
        let file = position.file.ok_or(CodeParserError::DetachedNode(node.id))?;
        let name = db
            .result
            .source_name(file)
            .ok_or(CodeParserError::UnknownSource(file))?;
        let line_column = self.collaborators.converter.offset_to_line_column(
            &position,
            file,
            &db.sources,
            Some(&db.result),
        )?;
        Ok(format!(
            "{} {}:{}",
            name, line_column.start.line, line_column.start.column
        ))
    }

    pub fn position_of_definition(&self, node: Option<&AstNode>) -> Option<SourceLocation> {
        node.map(goto_def::position_of_definition)
    }

    pub fn get_node_documentation(&self, node: &AstNode) -> Option<String> {
        hover::node_documentation(node)
    }

    pub fn get_variable_declaration(&self, node: &AstNode) -> String {
        hover::variable_declaration(node)
    }

    pub fn get_function_paramaters(&self, node: &AstNode) -> Option<String> {
        hover::function_parameters(node)
    }

    pub fn get_function_return_parameters(&self, node: &AstNode) -> Option<String> {
        hover::function_return_parameters(node)
    }
}
