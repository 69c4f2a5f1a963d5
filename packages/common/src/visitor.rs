use quire_model::{BlockNode, Document, TextRun};

/// Visitor pattern for traversing the Document Tree immutably
///
/// Default implementations walk every block and run in document order.
/// Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_block(&mut self, _index: usize, block: &BlockNode) {
        walk_block(self, block);
    }

    fn visit_text_run(&mut self, _run: &TextRun) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming the Document Tree
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_block_mut(&mut self, _index: usize, block: &mut BlockNode) {
        walk_block_mut(self, block);
    }

    fn visit_text_run_mut(&mut self, _run: &mut TextRun) {
        // Leaf node, no children to walk
    }
}

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for (index, block) in doc.blocks.iter().enumerate() {
        visitor.visit_block(index, block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &BlockNode) {
    for run in &block.content {
        visitor.visit_text_run(run);
    }
}

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut Document) {
    for (index, block) in doc.blocks.iter_mut().enumerate() {
        visitor.visit_block_mut(index, block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut BlockNode) {
    for run in &mut block.content {
        visitor.visit_text_run_mut(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_model::{BlockAttrs, BlockType, Mark};

    fn sample() -> Document {
        Document::new(vec![
            BlockNode::textblock(
                BlockType::Narration,
                Some("a".into()),
                vec![
                    TextRun::plain("one "),
                    TextRun::with_marks("two", vec![Mark::Em]),
                ],
            ),
            BlockNode::leaf(BlockType::Divider, Some("b".into()), BlockAttrs::None),
        ])
    }

    struct RunCounter {
        blocks: usize,
        runs: usize,
    }

    impl Visitor for RunCounter {
        fn visit_block(&mut self, _index: usize, block: &BlockNode) {
            self.blocks += 1;
            walk_block(self, block);
        }

        fn visit_text_run(&mut self, _run: &TextRun) {
            self.runs += 1;
        }
    }

    struct Shout;

    impl VisitorMut for Shout {
        fn visit_text_run_mut(&mut self, run: &mut TextRun) {
            run.text = run.text.to_uppercase();
        }
    }

    #[test]
    fn test_visitor_walks_blocks_and_runs() {
        let mut counter = RunCounter { blocks: 0, runs: 0 };
        counter.visit_document(&sample());
        assert_eq!(counter.blocks, 2);
        assert_eq!(counter.runs, 2);
    }

    #[test]
    fn test_visitor_mut_rewrites_runs() {
        let mut doc = sample();
        Shout.visit_document_mut(&mut doc);
        assert_eq!(doc.blocks[0].text_content(), "ONE TWO");
    }
}
