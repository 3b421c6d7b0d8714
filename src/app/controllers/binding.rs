use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use crate::app::domain::document::{Document, DocumentRole};
use crate::app::domain::messages::Message;
use crate::app::infrastructure::change_bus::Subscription;
use crate::app::infrastructure::editor::TextEditorWidget;

/// Two-way link between an editing widget and the document it edits.
///
/// Widget changes are posted as [`Message::LocalEdit`]; the engine decides
/// whether they mutate the document. Document content the widget does not
/// already show (seed content, navigation) is pushed back into the widget
/// with a full-range replace.
pub struct EditorBinding<W: TextEditorWidget> {
    role: DocumentRole,
    widget: Rc<RefCell<W>>,
    _subscription: Subscription,
}

impl<W: TextEditorWidget + 'static> EditorBinding<W> {
    pub fn attach(widget: Rc<RefCell<W>>, document: &Document, sender: Sender<Message>) -> Self {
        let role = document.role();

        widget.borrow_mut().set_on_change(Box::new(move |text: &str| {
            let _ = sender.send(Message::LocalEdit {
                role,
                text: text.to_string(),
            });
        }));

        let weak = Rc::downgrade(&widget);
        let subscription = document.subscribe(move |update| {
            let Some(widget) = weak.upgrade() else {
                return;
            };
            let Ok(mut widget) = widget.try_borrow_mut() else {
                log::debug!("{} editor busy, skipping sync", update.role.label());
                return;
            };
            let shown = widget.full_text();
            if shown != update.content {
                widget.replace_range(0, shown.len(), &update.content);
            }
        });

        Self {
            role,
            widget,
            _subscription: subscription,
        }
    }

    pub fn role(&self) -> DocumentRole {
        self.role
    }

    pub fn widget(&self) -> &Rc<RefCell<W>> {
        &self.widget
    }
}
