use tdoc::{ChecklistItem, Document as Tree, Paragraph, Span};

use super::{BlockInfo, BlockKind, ListMarker};

/// Location of one text-carrying block inside the `tdoc` tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlockPath {
    steps: Vec<PathStep>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PathStep {
    Root(usize),
    Child(usize),
    Entry {
        entry_index: usize,
        paragraph_index: usize,
    },
    ChecklistItem {
        indices: Vec<usize>,
    },
}

impl BlockPath {
    fn new_root(idx: usize) -> Self {
        Self {
            steps: vec![PathStep::Root(idx)],
        }
    }

    fn push_child(&mut self, idx: usize) {
        self.steps.push(PathStep::Child(idx));
    }

    fn push_entry(&mut self, entry_index: usize, paragraph_index: usize) {
        self.steps.push(PathStep::Entry {
            entry_index,
            paragraph_index,
        });
    }

    fn push_checklist_item(&mut self, indices: Vec<usize>) {
        self.steps.push(PathStep::ChecklistItem { indices });
    }

    fn pop(&mut self) {
        if self.steps.len() > 1 {
            self.steps.pop();
        }
    }

    fn split_checklist_step(&self) -> (&[PathStep], Option<&[usize]>) {
        match self.steps.split_last() {
            Some((PathStep::ChecklistItem { indices }, parents)) => {
                (parents, Some(indices.as_slice()))
            }
            _ => (&self.steps, None),
        }
    }
}

pub(crate) fn index_blocks(tree: &Tree) -> Vec<(BlockPath, BlockInfo)> {
    let mut collector = BlockCollector::default();
    for (idx, paragraph) in tree.paragraphs.iter().enumerate() {
        let mut path = BlockPath::new_root(idx);
        collector.collect_paragraph(paragraph, &mut path);
    }
    collector.blocks
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<(BlockPath, BlockInfo)>,
    quote_depth: usize,
    list_depth: usize,
    pending_marker: Option<ListMarker>,
}

impl BlockCollector {
    fn collect_paragraph(&mut self, paragraph: &Paragraph, path: &mut BlockPath) {
        match paragraph {
            Paragraph::Text { .. } => self.push_leaf(path, BlockKind::Text),
            Paragraph::Header1 { .. } => self.push_leaf(path, BlockKind::Heading(1)),
            Paragraph::Header2 { .. } => self.push_leaf(path, BlockKind::Heading(2)),
            Paragraph::Header3 { .. } => self.push_leaf(path, BlockKind::Heading(3)),
            Paragraph::CodeBlock { .. } => self.push_leaf(path, BlockKind::Code),
            Paragraph::Quote { children } => {
                self.quote_depth += 1;
                for (child_index, child) in children.iter().enumerate() {
                    path.push_child(child_index);
                    self.collect_paragraph(child, path);
                    path.pop();
                }
                self.quote_depth -= 1;
            }
            Paragraph::OrderedList { entries } => self.collect_entries(entries, path, true),
            Paragraph::UnorderedList { entries } => self.collect_entries(entries, path, false),
            Paragraph::Checklist { items } => {
                self.list_depth += 1;
                for (item_index, item) in items.iter().enumerate() {
                    self.collect_checklist_item(item, path, &[item_index]);
                }
                self.list_depth -= 1;
            }
        }
    }

    fn collect_entries(&mut self, entries: &[Vec<Paragraph>], path: &mut BlockPath, ordered: bool) {
        self.list_depth += 1;
        for (entry_index, entry) in entries.iter().enumerate() {
            self.pending_marker = Some(if ordered {
                ListMarker::Number(entry_index + 1)
            } else {
                ListMarker::Bullet
            });
            for (paragraph_index, paragraph) in entry.iter().enumerate() {
                path.push_entry(entry_index, paragraph_index);
                self.collect_paragraph(paragraph, path);
                path.pop();
            }
            self.pending_marker = None;
        }
        self.list_depth -= 1;
    }

    fn collect_checklist_item(&mut self, item: &ChecklistItem, path: &mut BlockPath, indices: &[usize]) {
        path.push_checklist_item(indices.to_vec());
        self.pending_marker = Some(ListMarker::Checkbox(item.checked));
        self.push_leaf(path, BlockKind::ChecklistItem);
        path.pop();

        self.list_depth += 1;
        for (child_index, child) in item.children.iter().enumerate() {
            let mut child_indices = indices.to_vec();
            child_indices.push(child_index);
            self.collect_checklist_item(child, path, &child_indices);
        }
        self.list_depth -= 1;
    }

    fn push_leaf(&mut self, path: &BlockPath, kind: BlockKind) {
        self.blocks.push((
            path.clone(),
            BlockInfo {
                kind,
                marker: self.pending_marker.take(),
                quote_depth: self.quote_depth,
                list_depth: self.list_depth,
            },
        ));
    }
}

pub(crate) fn block_content<'a>(tree: &'a Tree, path: &BlockPath) -> Option<&'a [Span]> {
    let (paragraph_steps, item_indices) = path.split_checklist_step();
    let paragraph = paragraph_ref(tree, paragraph_steps)?;
    match item_indices {
        Some(indices) => {
            let Paragraph::Checklist { items } = paragraph else {
                return None;
            };
            let mut item = items.get(*indices.first()?)?;
            for &idx in &indices[1..] {
                item = item.children.get(idx)?;
            }
            Some(item.content.as_slice())
        }
        None => leaf_content(paragraph),
    }
}

pub(crate) fn block_content_mut<'a>(tree: &'a mut Tree, path: &BlockPath) -> Option<&'a mut Vec<Span>> {
    let (paragraph_steps, item_indices) = path.split_checklist_step();
    let paragraph = paragraph_mut(tree, paragraph_steps)?;
    match item_indices {
        Some(indices) => {
            let Paragraph::Checklist { items } = paragraph else {
                return None;
            };
            let mut item = items.get_mut(*indices.first()?)?;
            for &idx in &indices[1..] {
                item = item.children.get_mut(idx)?;
            }
            Some(&mut item.content)
        }
        None => leaf_content_mut(paragraph),
    }
}

fn leaf_content(paragraph: &Paragraph) -> Option<&[Span]> {
    match paragraph {
        Paragraph::Text { content }
        | Paragraph::Header1 { content }
        | Paragraph::Header2 { content }
        | Paragraph::Header3 { content }
        | Paragraph::CodeBlock { content } => Some(content.as_slice()),
        _ => None,
    }
}

fn leaf_content_mut(paragraph: &mut Paragraph) -> Option<&mut Vec<Span>> {
    match paragraph {
        Paragraph::Text { content }
        | Paragraph::Header1 { content }
        | Paragraph::Header2 { content }
        | Paragraph::Header3 { content }
        | Paragraph::CodeBlock { content } => Some(content),
        _ => None,
    }
}

fn paragraph_ref<'a>(tree: &'a Tree, steps: &[PathStep]) -> Option<&'a Paragraph> {
    let mut iter = steps.iter();
    let mut paragraph = match iter.next()? {
        PathStep::Root(idx) => tree.paragraphs.get(*idx)?,
        _ => return None,
    };
    for step in iter {
        paragraph = match step {
            PathStep::Child(idx) => match paragraph {
                Paragraph::Quote { children } => children.get(*idx)?,
                _ => return None,
            },
            PathStep::Entry {
                entry_index,
                paragraph_index,
            } => match paragraph {
                Paragraph::OrderedList { entries } | Paragraph::UnorderedList { entries } => {
                    entries.get(*entry_index)?.get(*paragraph_index)?
                }
                _ => return None,
            },
            PathStep::ChecklistItem { .. } | PathStep::Root(_) => return None,
        };
    }
    Some(paragraph)
}

fn paragraph_mut<'a>(tree: &'a mut Tree, steps: &[PathStep]) -> Option<&'a mut Paragraph> {
    let mut iter = steps.iter();
    let mut paragraph = match iter.next()? {
        PathStep::Root(idx) => tree.paragraphs.get_mut(*idx)?,
        _ => return None,
    };
    for step in iter {
        paragraph = match step {
            PathStep::Child(idx) => {
                let Paragraph::Quote { children } = paragraph else {
                    return None;
                };
                children.get_mut(*idx)?
            }
            PathStep::Entry {
                entry_index,
                paragraph_index,
            } => match paragraph {
                Paragraph::OrderedList { entries } | Paragraph::UnorderedList { entries } => {
                    entries.get_mut(*entry_index)?.get_mut(*paragraph_index)?
                }
                _ => return None,
            },
            PathStep::ChecklistItem { .. } | PathStep::Root(_) => return None,
        };
    }
    Some(paragraph)
}
