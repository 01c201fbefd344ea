use crate::naming::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSequence {
    pub name: QualifiedName,
    pub data_type: String,
    pub start: i64,
    pub increment: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub cyclic: bool,
}

impl CreateSequence {
    pub fn new(name: impl Into<QualifiedName>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            start: 1,
            increment: 1,
            min: None,
            max: None,
            cyclic: false,
        }
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn increment(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }

    pub fn bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn cyclic(self) -> Self {
        self.cyclic_if(true)
    }

    pub fn cyclic_if(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSequence {
    pub name: QualifiedName,
}

impl DropSequence {
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSequence {
    pub name: QualifiedName,
    pub new_name: String,
}

impl RenameSequence {
    pub fn new(name: impl Into<QualifiedName>, new_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_name: new_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSequence {
    pub name: QualifiedName,
    pub new_schema: Option<String>,
}

impl MoveSequence {
    pub fn new(name: impl Into<QualifiedName>, new_schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            new_schema,
        }
    }
}

/// Changes increment, bounds and cycling. The start value is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterSequence {
    pub name: QualifiedName,
    pub increment: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub cyclic: bool,
}

impl AlterSequence {
    pub fn new(name: impl Into<QualifiedName>, increment: i64) -> Self {
        Self {
            name: name.into(),
            increment,
            min: None,
            max: None,
            cyclic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartSequence {
    pub name: QualifiedName,
    pub start: i64,
}

impl RestartSequence {
    pub fn new(name: impl Into<QualifiedName>, start: i64) -> Self {
        Self {
            name: name.into(),
            start,
        }
    }
}
