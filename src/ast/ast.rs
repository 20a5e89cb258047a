use crate::MK_NODE_CONSTRUCTORS;

use super::declarations::TypeId;

/// Index of a node inside its owning `Ast` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Node Kinds
///
/// Closed set of statement, expression and reference nodes that can appear
/// in a callable body or signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // References
    ClassOrInterfaceReference,
    ClassReference,
    ParentReference,
    SelfReference,
    StaticReference,
    TraitReference,
    PrimitiveType,

    // Primaries
    Identifier,
    Variable,
    VariableVariable,
    CompoundVariable,
    Literal,
    Constant,
    Array,
    ArrayElement,
    Closure,
    ArrowFunction,
    FormalParameters,
    FormalParameter,

    // Expressions
    Expression,
    AssignmentExpression,
    AllocationExpression,
    Arguments,
    BooleanAndExpression,
    BooleanOrExpression,
    LogicalAndExpression,
    LogicalOrExpression,
    LogicalXorExpression,
    ConditionalExpression,
    InstanceOfExpression,
    IssetExpression,
    EmptyExpression,
    CastExpression,
    CloneExpression,
    EvalExpression,
    ExitExpression,
    IncludeExpression,
    RequireExpression,
    PrintExpression,
    ListExpression,
    ArrayIndexExpression,
    StringIndexExpression,
    MemberPrimaryPrefix,
    MethodPostfix,
    PropertyPostfix,
    ConstantPostfix,
    FunctionPostfix,
    UnaryExpression,
    PreIncrementExpression,
    PreDecrementExpression,
    PostfixExpression,
    YieldExpression,
    MatchExpression,
    MatchArm,

    // Statements
    Statement,
    ScopeStatement,
    IfStatement,
    ElseIfStatement,
    ForStatement,
    ForInit,
    ForUpdate,
    ForeachStatement,
    WhileStatement,
    DoWhileStatement,
    SwitchStatement,
    SwitchLabel,
    TryStatement,
    CatchStatement,
    FinallyStatement,
    ThrowStatement,
    GotoStatement,
    LabelStatement,
    GlobalStatement,
    UnsetStatement,
    EchoStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    DeclareStatement,
    StaticVariableDeclaration,
    VariableDeclarator,
}

impl NodeKind {
    /// Reference kinds whose image is a resolvable type name.
    pub fn is_type_reference(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassOrInterfaceReference | NodeKind::ClassReference | NodeKind::TraitReference
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub image: String,
    pub children: Vec<NodeId>,
    /// Non-owning back reference, maintained by `Ast`.
    pub parent: Option<NodeId>,
    pub doc_comment: Option<String>,
    /// Declaration a self/static/parent reference points at, when known
    /// while parsing.
    pub target: Option<TypeId>,
}

impl Node {
    pub fn new(kind: NodeKind, image: impl Into<String>) -> Node {
        Node {
            kind,
            image: image.into(),
            children: Vec::new(),
            parent: None,
            doc_comment: None,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Option<TypeId>) -> Node {
        self.target = target;
        self
    }
}

MK_NODE_CONSTRUCTORS! {
    class_or_interface_reference => ClassOrInterfaceReference,
    class_reference => ClassReference,
    parent_reference => ParentReference,
    self_reference => SelfReference,
    static_reference => StaticReference,
    trait_reference => TraitReference,
    primitive_type => PrimitiveType,
    identifier => Identifier,
    variable => Variable,
    variable_variable => VariableVariable,
    compound_variable => CompoundVariable,
    literal => Literal,
    constant => Constant,
    array => Array,
    array_element => ArrayElement,
    closure => Closure,
    arrow_function => ArrowFunction,
    formal_parameters => FormalParameters,
    formal_parameter => FormalParameter,
    expression => Expression,
    assignment_expression => AssignmentExpression,
    allocation_expression => AllocationExpression,
    arguments => Arguments,
    boolean_and_expression => BooleanAndExpression,
    boolean_or_expression => BooleanOrExpression,
    logical_and_expression => LogicalAndExpression,
    logical_or_expression => LogicalOrExpression,
    logical_xor_expression => LogicalXorExpression,
    conditional_expression => ConditionalExpression,
    instance_of_expression => InstanceOfExpression,
    isset_expression => IssetExpression,
    empty_expression => EmptyExpression,
    cast_expression => CastExpression,
    clone_expression => CloneExpression,
    eval_expression => EvalExpression,
    exit_expression => ExitExpression,
    include_expression => IncludeExpression,
    require_expression => RequireExpression,
    print_expression => PrintExpression,
    list_expression => ListExpression,
    array_index_expression => ArrayIndexExpression,
    string_index_expression => StringIndexExpression,
    member_primary_prefix => MemberPrimaryPrefix,
    method_postfix => MethodPostfix,
    property_postfix => PropertyPostfix,
    constant_postfix => ConstantPostfix,
    function_postfix => FunctionPostfix,
    unary_expression => UnaryExpression,
    pre_increment_expression => PreIncrementExpression,
    pre_decrement_expression => PreDecrementExpression,
    postfix_expression => PostfixExpression,
    yield_expression => YieldExpression,
    match_expression => MatchExpression,
    match_arm => MatchArm,
    statement => Statement,
    scope_statement => ScopeStatement,
    if_statement => IfStatement,
    else_if_statement => ElseIfStatement,
    for_statement => ForStatement,
    for_init => ForInit,
    for_update => ForUpdate,
    foreach_statement => ForeachStatement,
    while_statement => WhileStatement,
    do_while_statement => DoWhileStatement,
    switch_statement => SwitchStatement,
    switch_label => SwitchLabel,
    try_statement => TryStatement,
    catch_statement => CatchStatement,
    finally_statement => FinallyStatement,
    throw_statement => ThrowStatement,
    goto_statement => GotoStatement,
    label_statement => LabelStatement,
    global_statement => GlobalStatement,
    unset_statement => UnsetStatement,
    echo_statement => EchoStatement,
    return_statement => ReturnStatement,
    break_statement => BreakStatement,
    continue_statement => ContinueStatement,
    declare_statement => DeclareStatement,
    static_variable_declaration => StaticVariableDeclaration,
    variable_declarator => VariableDeclarator,
}

/// Arena owning every statement and expression node of one build.
#[derive(Debug, Default, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Ast { nodes: Vec::new() }
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind
    }

    pub fn image(&self, id: NodeId) -> &str {
        &self.get(id).image
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.get(id).children.get(index).copied()
    }

    /// Appends `child` to `parent`. A child that already has a parent is
    /// detached from it first, so a node is never owned twice.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.get(child).parent {
            self.get_mut(old_parent).children.retain(|id| *id != child);
        }
        self.get_mut(child).parent = Some(parent);
        self.get_mut(parent).children.push(child);
    }

    /// Adds `node` to the arena and attaches it below `parent`.
    pub fn add_child_node(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add(node);
        self.add_child(parent, id);
        id
    }

    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.add_child(new_parent, child);
    }

    /// First descendant of `id` with the given kind, searched in pre-order.
    pub fn first_child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        for child in self.children(id) {
            if self.kind(*child) == kind {
                return Some(*child);
            }
            if let Some(found) = self.first_child_of_kind(*child, kind) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants of `id` with the given kind, in pre-order.
    pub fn find_children_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut results = Vec::new();
        self.collect_children_of_kind(id, kind, &mut results);
        results
    }

    fn collect_children_of_kind(&self, id: NodeId, kind: NodeKind, results: &mut Vec<NodeId>) {
        for child in self.children(id) {
            if self.kind(*child) == kind {
                results.push(*child);
            }
            self.collect_children_of_kind(*child, kind, results);
        }
    }
}
