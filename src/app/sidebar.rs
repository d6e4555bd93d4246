use super::{App, SidebarItem};

impl App {
    /// Selectable sidebar rows, top to bottom: the new-chat action, then each
    /// agent followed by its conversations.
    pub fn sidebar_items(&self) -> Vec<SidebarItem> {
        let mut items = vec![SidebarItem::NewChat];
        for (agent_index, agent) in self.agents.iter().enumerate() {
            items.push(SidebarItem::Agent(agent_index));
            items.extend(
                self.conversations
                    .conversations_for(&agent.id)
                    .iter()
                    .map(|record| SidebarItem::Conversation {
                        agent_index,
                        conversation_id: record.id.clone(),
                    }),
            );
        }
        items
    }

    pub(crate) fn move_sidebar_selection(&mut self, delta: isize) {
        let len = self.sidebar_items().len();
        let next = (self.sidebar_selected as isize + delta).clamp(0, len as isize - 1);
        self.sidebar_selected = next as usize;
    }

    pub(crate) fn clamp_sidebar_selection(&mut self) {
        let len = self.sidebar_items().len();
        self.sidebar_selected = self.sidebar_selected.min(len.saturating_sub(1));
    }

    /// Runs the action behind the highlighted sidebar row.
    pub(crate) fn activate_sidebar_selection(&mut self) {
        let Some(item) = self.sidebar_items().into_iter().nth(self.sidebar_selected) else {
            return;
        };
        match item {
            SidebarItem::NewChat => self.new_conversation(),
            SidebarItem::Agent(index) => self.select_agent(index),
            SidebarItem::Conversation {
                agent_index,
                conversation_id,
            } => {
                if let Some(agent_id) = self.agents.get(agent_index).map(|agent| agent.id.clone()) {
                    self.select_conversation(&agent_id, &conversation_id);
                }
            }
        }
        self.clamp_sidebar_selection();
    }
}
