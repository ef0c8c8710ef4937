use core::fmt;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::marker::PhantomData;

pub type StateName = String;
pub type DialogName = String;

/// Name of the state every graph starts from.
pub const ENTRY_STATE: &str = "entry";

/// A player-facing choice bound to a target state.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Response {
    pub text: String,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub jump: Option<StateName>,
}

impl Response {
    pub fn new<T, J>(text: T, jump: J) -> Self
    where
        T: Into<String>,
        J: Into<StateName>,
    {
        Self {
            text: text.into(),
            jump: Some(jump.into()).filter(|j: &String| !j.is_empty()),
        }
    }
}

/// One beat of a dialog.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_advance_after: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub jump: Option<StateName>,
}

impl DialogState {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_event<T: Into<String>>(mut self, event: T) -> Self {
        self.event = Some(event.into()).filter(|e: &String| !e.is_empty());
        self
    }

    pub fn with_jump<T: Into<StateName>>(mut self, jump: T) -> Self {
        self.jump = Some(jump.into()).filter(|j: &String| !j.is_empty());
        self
    }

    pub fn with_responses(mut self, responses: Vec<Response>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_auto_advance(mut self, seconds: f32) -> Self {
        self.auto_advance_after = Some(seconds);
        self
    }

    /// A state with responses is a branch point and needs a choice to advance.
    pub fn has_responses(&self) -> bool {
        !self.responses.is_empty()
    }

    /// Auto-advance delay, if the state declares a positive one.
    pub fn auto_advance(&self) -> Option<f32> {
        self.auto_advance_after.filter(|seconds| *seconds > 0.0)
    }
}

/// Error returned when two entries share a name.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DuplicateName(pub String);

impl std::error::Error for DuplicateName {}

impl fmt::Display for DuplicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate name `{}`", self.0)
    }
}

/// Ordered collection of states. Declaration order drives fallthrough.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct DialogGraph {
    states: Vec<(StateName, DialogState)>,
}

impl DialogGraph {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn from_states<I, N>(states: I) -> Result<Self, DuplicateName>
    where
        I: IntoIterator<Item = (N, DialogState)>,
        N: Into<StateName>,
    {
        let mut graph = Self::new();
        for (name, state) in states {
            graph.add_state(name, state)?;
        }
        Ok(graph)
    }

    pub fn add_state<N>(&mut self, name: N, state: DialogState) -> Result<usize, DuplicateName>
    where
        N: Into<StateName>,
    {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(DuplicateName(name));
        }
        self.states.push((name, state));
        Ok(self.states.len() - 1)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|(state_name, _)| state_name == name)
    }

    pub fn get(&self, name: &str) -> Option<&DialogState> {
        self.position(name).map(|index| &self.states[index].1)
    }

    pub fn state_at(&self, index: usize) -> Option<(&str, &DialogState)> {
        self.states
            .get(index)
            .map(|(name, state)| (name.as_str(), state))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DialogState)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }
}

/// Ordered collection of named graphs, as authored in a corpus file.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct DialogCorpus {
    dialogs: Vec<(DialogName, DialogGraph)>,
}

impl DialogCorpus {
    pub fn new() -> Self {
        Self {
            dialogs: Vec::new(),
        }
    }

    pub fn add_dialog<N>(&mut self, name: N, graph: DialogGraph) -> Result<usize, DuplicateName>
    where
        N: Into<DialogName>,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(DuplicateName(name));
        }
        self.dialogs.push((name, graph));
        Ok(self.dialogs.len() - 1)
    }

    pub fn get(&self, name: &str) -> Option<&DialogGraph> {
        self.dialogs
            .iter()
            .find(|(dialog_name, _)| dialog_name == name)
            .map(|(_, graph)| graph)
    }

    pub fn first(&self) -> Option<(&str, &DialogGraph)> {
        self.dialogs
            .first()
            .map(|(name, graph)| (name.as_str(), graph))
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DialogGraph)> {
        self.dialogs
            .iter()
            .map(|(name, graph)| (name.as_str(), graph))
    }
}

impl IntoIterator for DialogCorpus {
    type Item = (DialogName, DialogGraph);
    type IntoIter = std::vec::IntoIter<(DialogName, DialogGraph)>;

    fn into_iter(self) -> Self::IntoIter {
        self.dialogs.into_iter()
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Reads a JSON object as a list of entries, keeping document order.
struct OrderedEntries<T> {
    expecting: &'static str,
    marker: PhantomData<T>,
}

impl<'de, T> Visitor<'de> for OrderedEntries<T>
where
    T: Deserialize<'de>,
{
    type Value = Vec<(String, T)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, T>()? {
            if entries.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(DuplicateName(name)));
            }
            entries.push((name, value));
        }
        Ok(entries)
    }
}

impl<'de> Deserialize<'de> for DialogGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let states = deserializer.deserialize_map(OrderedEntries {
            expecting: "a map of state names to dialog states",
            marker: PhantomData,
        })?;
        Ok(DialogGraph { states })
    }
}

impl Serialize for DialogGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.states.len()))?;
        for (name, state) in &self.states {
            map.serialize_entry(name, state)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DialogCorpus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dialogs = deserializer.deserialize_map(OrderedEntries {
            expecting: "a map of dialog names to dialog graphs",
            marker: PhantomData,
        })?;
        Ok(DialogCorpus { dialogs })
    }
}

impl Serialize for DialogCorpus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.dialogs.len()))?;
        for (name, graph) in &self.dialogs {
            map.serialize_entry(name, graph)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_keeps_declaration_order() {
        let json = r#"{
            "entry": { "text": "first" },
            "zebra": { "text": "second" },
            "apple": { "text": "third" }
        }"#;

        let graph: DialogGraph = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = graph.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["entry", "zebra", "apple"]);
        assert_eq!(graph.position("apple"), Some(2));
        assert_eq!(graph.state_at(1).map(|(_, s)| s.text.as_str()), Some("second"));
    }

    #[test]
    fn graph_rejects_duplicate_states() {
        let json = r#"{ "entry": { "text": "a" }, "entry": { "text": "b" } }"#;

        let result: Result<DialogGraph, _> = serde_json::from_str(json);
        let err = result.unwrap_err();

        assert!(err.to_string().contains("duplicate name `entry`"));
    }

    #[test]
    fn state_fields_use_camel_case() {
        let json = r#"{
            "text": "Pick one",
            "event": "door_open",
            "autoAdvanceAfter": 1.5,
            "responses": [
                { "text": "Left", "jump": "left" },
                { "text": "Right" }
            ]
        }"#;

        let state: DialogState = serde_json::from_str(json).unwrap();

        assert_eq!(state.event.as_deref(), Some("door_open"));
        assert_eq!(state.auto_advance(), Some(1.5));
        assert!(state.has_responses());
        assert_eq!(state.responses[0].jump.as_deref(), Some("left"));
        assert_eq!(state.responses[1].jump, None);
    }

    #[test]
    fn empty_jump_is_absent() {
        let json = r#"{ "text": "x", "jump": "", "event": "" }"#;

        let state: DialogState = serde_json::from_str(json).unwrap();

        assert_eq!(state.jump, None);
        assert_eq!(state.event, None);
        assert_eq!(DialogState::new("x").with_jump(""), DialogState::new("x"));
    }

    #[test]
    fn zero_auto_advance_is_disabled() {
        let state = DialogState::new("x").with_auto_advance(0.0);
        assert_eq!(state.auto_advance(), None);
    }

    #[test]
    fn add_state_reports_duplicates() {
        let mut graph = DialogGraph::new();
        assert_eq!(graph.add_state("entry", DialogState::new("a")), Ok(0));
        assert_eq!(
            graph.add_state("entry", DialogState::new("b")),
            Err(DuplicateName("entry".to_string()))
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn corpus_keeps_dialog_order() {
        let json = r#"{
            "intro": { "entry": { "text": "hello" } },
            "outro": { "entry": { "text": "bye" } }
        }"#;

        let corpus: DialogCorpus = serde_json::from_str(json).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.first().map(|(name, _)| name), Some("intro"));
        assert_eq!(
            corpus.get("outro").and_then(|g| g.get("entry")).map(|s| s.text.as_str()),
            Some("bye")
        );
    }

    #[test]
    fn graph_serializes_in_order() {
        let graph = DialogGraph::from_states(vec![
            ("entry", DialogState::new("a").with_jump("end")),
            ("end", DialogState::new("b")),
        ])
        .unwrap();

        let json = serde_json::to_string(&graph).unwrap();

        assert_eq!(
            json,
            r#"{"entry":{"text":"a","jump":"end"},"end":{"text":"b"}}"#
        );
    }
}
