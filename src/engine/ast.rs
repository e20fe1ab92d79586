//! Recorded parse tree: a flat list of paired down/up records for the rules
//! selected for recording, replayed in document order by [`Ast::translate`].

/// Which side of a rule's phrase a translation callback is seeing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Pre,
    Post,
}

/// What a pre-visit callback wants done with the node's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Translate {
    Continue,
    /// Skip every descendant record and the node's own post-visit.
    Skip,
}

/// Translation callback: visit side, the full input, phrase offset and
/// phrase length, and the caller's data. The return value is ignored on
/// post-visits.
pub(crate) type AstCallback<T> = fn(Visit, &[u8], usize, usize, &mut T) -> Translate;

#[derive(Debug, Clone)]
struct Record {
    rule: usize,
    visit: Visit,
    /// Index of the matching down or up record.
    partner: usize,
    phrase_index: usize,
    phrase_length: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Ast {
    records: Vec<Record>,
}

impl Ast {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Open a node for `rule` at `phrase_index`; returns the record index to
    /// pass to [`Ast::up`].
    pub(crate) fn down(&mut self, rule: usize, phrase_index: usize) -> usize {
        let index = self.records.len();
        self.records.push(Record {
            rule,
            visit: Visit::Pre,
            partner: index,
            phrase_index,
            phrase_length: 0,
        });
        index
    }

    /// Close the node opened at `down` with its matched phrase.
    pub(crate) fn up(&mut self, down: usize, phrase_length: usize) {
        let index = self.records.len();
        let (rule, phrase_index) = {
            let open = &mut self.records[down];
            open.partner = index;
            open.phrase_length = phrase_length;
            (open.rule, open.phrase_index)
        };
        self.records.push(Record {
            rule,
            visit: Visit::Post,
            partner: down,
            phrase_index,
            phrase_length,
        });
    }

    /// Replay the tree depth-first, calling `callbacks[rule]` on both sides
    /// of every recorded node.
    pub(crate) fn translate<T>(
        &self,
        input: &[u8],
        callbacks: &[Option<AstCallback<T>>],
        data: &mut T,
    ) {
        let mut i = 0;
        while i < self.records.len() {
            let record = &self.records[i];
            if let Some(callback) = callbacks.get(record.rule).copied().flatten() {
                let action = callback(
                    record.visit,
                    input,
                    record.phrase_index,
                    record.phrase_length,
                    data,
                );
                if record.visit == Visit::Pre && action == Translate::Skip {
                    i = record.partner;
                }
            }
            i += 1;
        }
    }
}
